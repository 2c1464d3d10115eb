//! Seed content: the embedded order fixture and the knowledge-base
//! articles the `seed` command loads. Embeddings are generated at seed
//! time, so articles here carry text only.

use chrono::Utc;
use maildesk_core::domain::knowledge::KnowledgeEntry;
use serde_json::json;
use uuid::Uuid;

pub const SAMPLE_ORDERS_JSON: &str = include_str!("../fixtures/sample_orders.json");

#[derive(Clone, Debug)]
pub struct SeedArticle {
    pub title: &'static str,
    pub category: &'static str,
    pub content: &'static str,
}

impl SeedArticle {
    /// Builds the storable entry once an embedding has been generated for
    /// the article content.
    pub fn into_entry(self, embedding: Vec<f32>) -> KnowledgeEntry {
        KnowledgeEntry {
            id: Uuid::new_v4().to_string(),
            content: self.content.to_string(),
            category: self.category.to_string(),
            title: Some(self.title.to_string()),
            metadata: json!({"source": "seed"}),
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// The baseline FAQ and policy set.
pub fn seed_articles() -> Vec<SeedArticle> {
    vec![
        SeedArticle {
            title: "Return policy",
            category: "policy",
            content: "We accept returns within 30 days of delivery. Items must be unused, \
                      in their original packaging, and accompanied by the order number. \
                      Refunds are issued to the original payment method within 5-7 business \
                      days of receiving the return. Final-sale items and gift cards cannot \
                      be returned.",
        },
        SeedArticle {
            title: "How to start a return",
            category: "faq",
            content: "To start a return, reply to your order confirmation email or contact \
                      support with your order number. We will email you a prepaid return \
                      label. Drop the package at any carrier location within 14 days of \
                      receiving the label.",
        },
        SeedArticle {
            title: "Refund processing times",
            category: "policy",
            content: "Refunds are processed within 5-7 business days after the returned \
                      items arrive at our warehouse. Refunds over $100 require a manual \
                      review by our support team and may take up to 10 business days. You \
                      will receive an email confirmation once the refund is issued.",
        },
        SeedArticle {
            title: "Shipping options and delivery times",
            category: "shipping",
            content: "Standard shipping takes 5-7 business days and is free on orders over \
                      $50. Expedited shipping (2-3 business days) is available at checkout \
                      for $12.95. We currently ship to the United States and Canada. Orders \
                      placed before 1pm ET ship the same business day.",
        },
        SeedArticle {
            title: "Tracking your order",
            category: "shipping",
            content: "Once your order ships you will receive a confirmation email with a \
                      tracking number and a link to the carrier's tracking page. Tracking \
                      information can take up to 24 hours to appear after the shipping \
                      label is created.",
        },
        SeedArticle {
            title: "Changing or cancelling an order",
            category: "faq",
            content: "Orders can be changed or cancelled within one hour of being placed. \
                      After that our warehouse begins processing and we can no longer \
                      modify the order. If you miss the window, you can return the items \
                      once they arrive under our standard return policy.",
        },
        SeedArticle {
            title: "Warranty coverage",
            category: "policy",
            content: "All gear carries a one-year warranty against manufacturing defects. \
                      The warranty covers seams, zippers, buckles, and material failures \
                      under normal use. It does not cover normal wear, misuse, or damage \
                      from improper care. Contact support with photos and your order \
                      number to open a warranty claim.",
        },
        SeedArticle {
            title: "Tent sizing guide",
            category: "product",
            content: "Our 2-person tents have a floor area of 31 square feet and a peak \
                      height of 43 inches; they fit two sleeping pads side by side. The \
                      3-person models add 12 square feet of floor area and a second door. \
                      For backpacking with a dog or extra gear, we recommend sizing up.",
        },
        SeedArticle {
            title: "Jacket care instructions",
            category: "product",
            content: "Machine wash rain jackets cold on a gentle cycle with technical \
                      fabric cleaner, never fabric softener. Tumble dry low to reactivate \
                      the durable water repellent coating. Reproof with a spray-on DWR \
                      treatment when water stops beading on the surface.",
        },
        SeedArticle {
            title: "Payment methods",
            category: "faq",
            content: "We accept Visa, Mastercard, American Express, Discover, PayPal, and \
                      major mobile wallets. Payment is captured when your order ships. We \
                      do not accept checks or money orders.",
        },
    ]
}

#[cfg(test)]
mod tests {
    use maildesk_core::domain::knowledge::KNOWLEDGE_CATEGORIES;

    use super::seed_articles;

    #[test]
    fn articles_use_known_categories_and_unique_titles() {
        let articles = seed_articles();
        assert!(!articles.is_empty());

        for article in &articles {
            assert!(
                KNOWLEDGE_CATEGORIES.contains(&article.category),
                "unknown category {}",
                article.category
            );
            assert!(!article.content.trim().is_empty());
        }

        let mut titles: Vec<&str> = articles.iter().map(|article| article.title).collect();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), articles.len());
    }
}
