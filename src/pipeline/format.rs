// src/pipeline/format.rs

//! Message composition for products and promotions.

use unicode_segmentation::UnicodeSegmentation;

use crate::models::{Category, OutboundMessage, ProductRecord, Promotion};

/// Titles longer than this are cut and marked with an ellipsis.
const MAX_TITLE_LEN: usize = 150;
const ELLIPSIS: &str = "...";

const PROMO_BUTTON_LABEL: &str = "👉 ¡Activar y Aprovechar! 👈";

/// Compose the message for one product candidate.
///
/// Returns `None` when the record lacks a price: the candidate is skipped,
/// not treated as an error, and stays eligible for later cycles.
pub fn format_product(product: &ProductRecord, category: Category) -> Option<OutboundMessage> {
    let price = product.price_display.as_deref()?;
    let title = truncate_title(&product.title);

    let (header, button_label) = match category {
        Category::BackToSchool => ("📚", "🎒 Ver en Amazon 🎒"),
        Category::YouthApparel => ("👕", "👟 Ver en Amazon 👟"),
        Category::Promotion => ("✨", "🔥 ¡Ver Oferta AHORA! 🔥"),
    };

    let mut caption = format!(
        "{header} **¡OFERTA A LA VISTA!** {header}\n\n✨ {title}\n\n💸 **Precio Actual:** {price}"
    );
    if let Some(saving) = &product.saving_display {
        caption.push_str(&format!("\n📉 **¡Ahorras {saving}!**"));
    }

    Some(OutboundMessage {
        caption,
        image_url: product.image_url.clone(),
        button_label: button_label.to_string(),
        button_url: product.detail_url.clone(),
    })
}

/// Compose the message for one daily promotion.
///
/// The pre-authored caption is used verbatim, with no truncation.
pub fn format_promotion(promotion: &Promotion) -> OutboundMessage {
    OutboundMessage {
        caption: promotion.text.clone(),
        image_url: promotion.image_url.clone(),
        button_label: PROMO_BUTTON_LABEL.to_string(),
        button_url: promotion.url.clone(),
    }
}

/// Cut a title to `MAX_TITLE_LEN` grapheme clusters plus an ellipsis.
fn truncate_title(title: &str) -> String {
    let graphemes: Vec<&str> = title.graphemes(true).collect();
    if graphemes.len() <= MAX_TITLE_LEN {
        title.to_string()
    } else {
        let mut cut: String = graphemes[..MAX_TITLE_LEN].concat();
        cut.push_str(ELLIPSIS);
        cut
    }
}
