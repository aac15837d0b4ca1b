//! Application state wiring all services together.
//!
//! Services are generic over repository and store traits; AppState pins them
//! to the SQLite repositories, the in-memory ephemeral store and a tokio
//! reply delay.

use std::path::PathBuf;
use std::sync::Arc;

use haven_core::chat::responder::{AssistantResponder, TokioDelay};
use haven_core::chat::service::ChatService;
use haven_core::counselor::service::CounselorService;
use haven_core::llm::box_provider::BoxLlmProvider;
use haven_core::profile::service::ProfileService;
use haven_core::query::service::QueryService;
use haven_infra::config::{load_global_config, resolve_reply_delay};
use haven_infra::ephemeral::memory::MemoryKvStore;
use haven_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use haven_infra::llm::{UnavailableProvider, create_provider};
use haven_infra::sqlite::chat::SqliteChatRepository;
use haven_infra::sqlite::counselor::SqliteCounselorRepository;
use haven_infra::sqlite::pool::{DatabasePool, database_url};
use haven_infra::sqlite::profile::SqliteProfileRepository;
use haven_infra::sqlite::query::SqliteQueryRepository;
use haven_types::config::GlobalConfig;

pub type ConcreteChatService = ChatService<SqliteChatRepository, MemoryKvStore, TokioDelay>;

pub type ConcreteCounselorService = CounselorService<SqliteCounselorRepository>;

pub type ConcreteQueryService = QueryService<SqliteQueryRepository, SqliteCounselorRepository>;

pub type ConcreteProfileService = ProfileService<SqliteProfileRepository>;

/// Shared application state used by both CLI commands and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub counselor_service: Arc<ConcreteCounselorService>,
    pub query_service: Arc<ConcreteQueryService>,
    pub profile_service: Arc<ConcreteProfileService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: data dir, config, database, provider.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let db_url = format!("{}?mode=rwc", database_url(&data_dir));
        let db_pool = DatabasePool::new(&db_url).await?;

        let api_key = std::env::var("GEMINI_API_KEY").ok();
        let provider = match create_provider(&config.assistant, api_key.as_deref()) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "GEMINI_API_KEY not usable; the AI assistant will answer with its fallback reply"
                );
                BoxLlmProvider::new(UnavailableProvider)
            }
        };

        let delay = TokioDelay::new(resolve_reply_delay(&config));
        Ok(Self::build(db_pool, data_dir, config, provider, delay))
    }

    /// Wire services over an open pool.
    pub fn build(
        db_pool: DatabasePool,
        data_dir: PathBuf,
        config: GlobalConfig,
        provider: BoxLlmProvider,
        delay: TokioDelay,
    ) -> Self {
        let assistant = AssistantResponder::new(provider, config.assistant.clone());
        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            MemoryKvStore::new(),
            delay,
            assistant,
        );
        let counselor_service = CounselorService::new(SqliteCounselorRepository::new(db_pool.clone()));
        let query_service = QueryService::new(
            SqliteQueryRepository::new(db_pool.clone()),
            SqliteCounselorRepository::new(db_pool.clone()),
        );
        let profile_service = ProfileService::new(SqliteProfileRepository::new(db_pool));

        Self {
            chat_service: Arc::new(chat_service),
            counselor_service: Arc::new(counselor_service),
            query_service: Arc::new(query_service),
            profile_service: Arc::new(profile_service),
            config: Arc::new(config),
            data_dir,
        }
    }
}
