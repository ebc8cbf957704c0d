//! Background generation tasks spawned for [`AppCommand`]s.
//!
//! Each task runs one request against the [`Generator`] and reports back by
//! dispatching an action, so results are applied on the event loop like any
//! other state change.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::app::{AppAction, AppActionDispatcher, AppCommand};
use crate::core::chat_stream::ChatStreamService;
use crate::core::generation::Generator;

#[derive(Clone)]
pub struct ExecutorContext {
    pub dispatcher: AppActionDispatcher,
    pub generator: Arc<dyn Generator>,
    pub stream_service: ChatStreamService,
}

impl ExecutorContext {
    pub fn run(&self, command: AppCommand) {
        match command {
            AppCommand::SpawnStream(params) => self.stream_service.spawn_stream(params),
            AppCommand::GenerateTitle {
                session_id,
                first_message,
                language,
            } => spawn_title(self.clone(), session_id, first_message, language),
            AppCommand::Enrich {
                item_id,
                content,
                bible_version,
                language,
            } => spawn_enrichment(self.clone(), item_id, content, bible_version, language),
            AppCommand::GenerateDevotional {
                day_id,
                seed,
                language,
            } => spawn_devotional(self.clone(), day_id, seed, language),
        }
    }
}

fn spawn_title(ctx: ExecutorContext, session_id: String, first_message: String, language: String) {
    tokio::spawn(async move {
        let title = match ctx.generator.generate_title(&first_message, &language).await {
            Ok(title) => Some(title),
            Err(err) => {
                // The placeholder title stays; nothing to show the user.
                warn!(session = %session_id, error = %err, "title generation failed");
                None
            }
        };
        ctx.dispatcher
            .dispatch(AppAction::TitleGenerated { session_id, title });
    });
}

fn spawn_enrichment(
    ctx: ExecutorContext,
    item_id: String,
    content: String,
    bible_version: String,
    language: String,
) {
    tokio::spawn(async move {
        debug!(item = %item_id, "enriching study item");
        let result = ctx
            .generator
            .enrich(&content, &bible_version, &language)
            .await
            .map_err(|err| err.to_string());
        ctx.dispatcher
            .dispatch(AppAction::EnrichmentCompleted { item_id, result });
    });
}

fn spawn_devotional(ctx: ExecutorContext, day_id: String, seed: String, language: String) {
    tokio::spawn(async move {
        debug!(day = %day_id, %seed, "generating devotional");
        let result = ctx
            .generator
            .generate_devotional(&language, &seed)
            .await
            .map_err(|err| err.to_string());
        ctx.dispatcher
            .dispatch(AppAction::DevotionalGenerated { day_id, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ApiError;
    use crate::core::devotional::{DevotionalContent, Reading};
    use crate::core::generation::GenerationError;
    use crate::core::study::Enrichment;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    struct FakeGenerator {
        fail: bool,
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate_title(
            &self,
            first_message: &str,
            _language: &str,
        ) -> Result<String, GenerationError> {
            if self.fail {
                return Err(GenerationError::Api(ApiError::Status {
                    status: 500,
                    message: "boom".into(),
                }));
            }
            Ok(format!("About {first_message}"))
        }

        async fn generate_devotional(
            &self,
            language: &str,
            seed: &str,
        ) -> Result<DevotionalContent, GenerationError> {
            if self.fail {
                return Err(GenerationError::InvalidDevotional);
            }
            Ok(DevotionalContent {
                reading: Reading {
                    reference: "Lamentations 3:22-23".into(),
                    text: "His mercies are new every morning.".into(),
                },
                reflection: format!("{language}:{seed}"),
                prayer: "Amen.".into(),
            })
        }

        async fn enrich(
            &self,
            _content: &str,
            bible_version: &str,
            _language: &str,
        ) -> Result<Enrichment, GenerationError> {
            if self.fail {
                return Err(GenerationError::InvalidEnrichment);
            }
            Ok(Enrichment {
                keywords: vec![bible_version.to_string()],
                ai_reflection: "Reflect.".into(),
                cross_references: Vec::new(),
            })
        }
    }

    fn context(fail: bool) -> (ExecutorContext, mpsc::UnboundedReceiver<AppAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (stream_service, _stream_rx) = ChatStreamService::new();
        let ctx = ExecutorContext {
            dispatcher: AppActionDispatcher::new(tx),
            generator: Arc::new(FakeGenerator { fail }),
            stream_service,
        };
        (ctx, rx)
    }

    #[tokio::test]
    async fn title_result_is_dispatched() {
        let (ctx, mut rx) = context(false);
        ctx.run(AppCommand::GenerateTitle {
            session_id: "17".into(),
            first_message: "grace".into(),
            language: "en".into(),
        });

        assert_eq!(
            rx.recv().await,
            Some(AppAction::TitleGenerated {
                session_id: "17".into(),
                title: Some("About grace".into()),
            })
        );
    }

    #[tokio::test]
    async fn failed_title_falls_back_to_none() {
        let (ctx, mut rx) = context(true);
        ctx.run(AppCommand::GenerateTitle {
            session_id: "17".into(),
            first_message: "grace".into(),
            language: "en".into(),
        });

        assert_eq!(
            rx.recv().await,
            Some(AppAction::TitleGenerated {
                session_id: "17".into(),
                title: None,
            })
        );
    }

    #[tokio::test]
    async fn enrichment_errors_carry_their_message() {
        let (ctx, mut rx) = context(true);
        ctx.run(AppCommand::Enrich {
            item_id: "study-1".into(),
            content: "text".into(),
            bible_version: "KJV".into(),
            language: "en".into(),
        });

        assert_eq!(
            rx.recv().await,
            Some(AppAction::EnrichmentCompleted {
                item_id: "study-1".into(),
                result: Err("Invalid enrichment data.".into()),
            })
        );
    }

    #[tokio::test]
    async fn devotional_uses_language_and_seed() {
        let (ctx, mut rx) = context(false);
        ctx.run(AppCommand::GenerateDevotional {
            day_id: "2024-05-01".into(),
            seed: "user-1-2024-05-01".into(),
            language: "es".into(),
        });

        match rx.recv().await {
            Some(AppAction::DevotionalGenerated { day_id, result }) => {
                assert_eq!(day_id, "2024-05-01");
                assert_eq!(result.unwrap().reflection, "es:user-1-2024-05-01");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }
}
