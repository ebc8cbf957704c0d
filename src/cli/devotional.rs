//! Print today's devotional outside the UI.

use std::error::Error;

use chrono::Local;
use tracing::info;

use super::Prepared;
use crate::core::devotional::{daily_seed, today_id, Devotional, DevotionalStore};
use crate::core::generation::{GenerationError, Generator};
use crate::core::ids::IdGenerator;
use crate::core::storage::LocalStore;

pub async fn run_devotional<G: Generator>(
    generator: &G,
    prepared: &Prepared,
) -> Result<(), Box<dyn Error>> {
    let devotional = match ensure_devotional(
        generator,
        &prepared.store,
        &today_id(),
        &prepared.preferences.language,
    )
    .await
    {
        Ok(devotional) => devotional,
        Err(err) => {
            eprintln!("❌ Could not generate devotional: {err}");
            std::process::exit(1);
        }
    };
    println!("{}", format_devotional(&devotional));
    Ok(())
}

/// The stored devotional for `day_id`, generating and saving one if absent.
pub async fn ensure_devotional<G: Generator>(
    generator: &G,
    store: &LocalStore,
    day_id: &str,
    language: &str,
) -> Result<Devotional, GenerationError> {
    let mut devotionals = DevotionalStore::load(store);
    if let Some(existing) = devotionals.for_day(day_id) {
        return Ok(existing.clone());
    }

    let seed = daily_seed(&store.user_id(), day_id);
    let content = generator.generate_devotional(language, &seed).await?;
    let mut ids = IdGenerator::new();
    let devotional = Devotional::from_content(
        ids.next_prefixed("devo"),
        day_id,
        Local::now().to_rfc3339(),
        content,
    );
    if devotionals.insert(devotional.clone()).is_ok() {
        devotionals.save(store);
        info!(day = %day_id, "stored devotional from the command line");
    }
    Ok(devotional)
}

pub fn format_devotional(devotional: &Devotional) -> String {
    format!(
        "📖 Devotional for {}\n\n{}\n{}\n\nReflection\n{}\n\nPrayer\n{}",
        devotional.day_id,
        devotional.reading.reference,
        devotional.reading.text,
        devotional.reflection,
        devotional.prayer
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::devotional::{DevotionalContent, Reading};
    use crate::core::study::Enrichment;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generator for CountingGenerator {
        async fn generate_title(&self, _: &str, _: &str) -> Result<String, GenerationError> {
            Ok(String::new())
        }

        async fn generate_devotional(
            &self,
            _language: &str,
            _seed: &str,
        ) -> Result<DevotionalContent, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DevotionalContent {
                reading: Reading {
                    reference: "Psalm 23:1".into(),
                    text: "The Lord is my shepherd,\n\n\n\nI lack nothing.".into(),
                },
                reflection: "Trust.".into(),
                prayer: "Amen.".into(),
            })
        }

        async fn enrich(&self, _: &str, _: &str, _: &str) -> Result<Enrichment, GenerationError> {
            Err(GenerationError::InvalidEnrichment)
        }
    }

    #[tokio::test]
    async fn generates_once_per_day() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let generator = CountingGenerator::default();

        let first = ensure_devotional(&generator, &store, "2026-10-19", "en")
            .await
            .unwrap();
        let second = ensure_devotional(&generator, &store, "2026-10-19", "en")
            .await
            .unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(first.reading.text, "The Lord is my shepherd,\n\nI lack nothing.");
        assert_eq!(DevotionalStore::load(&store).len(), 1);
    }

    #[test]
    fn formatted_output_has_every_section() {
        let devotional = Devotional::from_content(
            "devo-1",
            "2026-10-19",
            "2026-10-19T07:00:00+00:00",
            DevotionalContent {
                reading: Reading {
                    reference: "John 1:5".into(),
                    text: "The light shines in the darkness.".into(),
                },
                reflection: "Light wins.".into(),
                prayer: "Lord, shine.".into(),
            },
        );
        let text = format_devotional(&devotional);
        assert!(text.starts_with("📖 Devotional for 2026-10-19"));
        assert!(text.contains("John 1:5\nThe light shines in the darkness."));
        assert!(text.contains("Reflection\nLight wins."));
        assert!(text.ends_with("Prayer\nLord, shine."));
    }
}
