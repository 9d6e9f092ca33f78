//! Shared setup for the integration tests
//!
//! Every test gets its own RocksDB directory and a mailer that records (or
//! refuses) what it is asked to send.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use admin_server::core::{Config, ServerState};
use admin_server::db::DbService;
use admin_server::db::models::{CartItem, Order, OrderCreate};
use admin_server::db::repository::OrderRepository;
use admin_server::services::email::{EmailError, Mailer, OutgoingEmail, SharedMailer};
use async_trait::async_trait;
use tempfile::TempDir;

/// Keeps every message it is handed
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

/// Always fails, like an SMTP server that is down
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), EmailError> {
        Err(EmailError::InvalidAddress("mail server unavailable".into()))
    }
}

pub struct TestEnv {
    pub state: ServerState,
    pub mailer: Arc<RecordingMailer>,
    // dropped last, removes the database directory
    _dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let (state, dir) = build_state(mailer.clone()).await;
        Self {
            state,
            mailer,
            _dir: dir,
        }
    }

    /// Extra environment on top of the per-test work dir
    pub async fn with_vars(vars: &[(&str, &str)]) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let dir = tempfile::tempdir().expect("tempdir");
        let work_dir = dir.path().to_string_lossy().to_string();
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = Config::from_lookup(move |name: &str| match name {
            "WORK_DIR" => Some(work_dir.clone()),
            "STATIC_DIR" => Some(format!("{work_dir}/dist")),
            _ => vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()),
        })
        .expect("config");
        let db = DbService::new(config.database_dir()).await.expect("open database");
        Self {
            state: ServerState::new(config, db.db, mailer.clone()),
            mailer,
            _dir: dir,
        }
    }

    pub async fn with_failing_mailer() -> Self {
        let (state, dir) = build_state(Arc::new(FailingMailer)).await;
        Self {
            state,
            mailer: Arc::new(RecordingMailer::default()),
            _dir: dir,
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.mailer.sent.lock().unwrap().clone()
    }

    /// Give spawned notification tasks a chance to run
    pub async fn settle(&self) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    pub async fn place_order(&self, user_id: Option<&str>, user_name: &str, total: f64) -> Order {
        OrderRepository::new(self.state.get_db())
            .create(OrderCreate {
                user_id: user_id.map(str::to_string),
                user_name: user_name.to_string(),
                user_email: format!("{}@example.com", user_name.to_lowercase()),
                cart_items: vec![CartItem {
                    title: "Sourdough loaf".into(),
                    price: total,
                }],
                total_amount: total,
                pickup_date_time: "2025-03-01T09:30".into(),
                payment_method: "card".into(),
            })
            .await
            .expect("create order")
    }
}

pub fn order_id(order: &Order) -> String {
    order.id.as_ref().expect("order id").to_string()
}

async fn build_state(mailer: SharedMailer) -> (ServerState, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config::for_work_dir(dir.path().to_string_lossy().to_string()).expect("config");
    let db = DbService::new(config.database_dir()).await.expect("open database");
    (ServerState::new(config, db.db, mailer), dir)
}
