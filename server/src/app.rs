//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::api::auth::password;
use crate::api::{ApiServer, AuthManager};
use crate::core::cli::{self, CliConfig, Commands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{CRATE_TARGET, ENV_LOG};
use crate::core::secret::SigningKey;
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::types::{LeadSource, LeadStatus, NewLead};
use crate::data::{DataError, TransactionalService};
use crate::utils::time::now_millis;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<TransactionalService>,
    pub auth: Arc<AuthManager>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => Self::handle_system_command(system_cmd),
            Some(Commands::Seed {
                email,
                password,
                count,
            }) => Self::seed(&cli_config, &email, &password, count).await,
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;

        let database = Arc::new(
            TransactionalService::init(&storage)
                .await
                .context("Failed to initialize database")?,
        );
        let signing_key = SigningKey::resolve(&config.auth, &storage)?;
        let auth = Arc::new(AuthManager::new(signing_key, &config.auth));
        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
            auth,
        })
    }

    fn handle_system_command(cmd: SystemCommands) -> Result<()> {
        match cmd {
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();

        if !data_dir.exists() {
            println!(
                "Nothing to prune. Data directory does not exist: {}",
                data_dir.display()
            );
            return Ok(());
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!("This will permanently delete the local data directory:");
        println!("  {}", data_dir.display());
        println!();
        println!(
            "Make sure the server is not running. \
             Deleting data while the server is running will cause data corruption."
        );

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    /// Create the seed user if missing and insert `count` random leads
    async fn seed(cli: &CliConfig, email: &str, password: &str, count: u32) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;
        let database = TransactionalService::init(&storage)
            .await
            .context("Failed to initialize database")?;
        let repo = database.repository();

        let email = email.trim().to_lowercase();
        let user = match repo.get_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                let hash = password::hash_password(password);
                repo.create_user(&email, &hash).await?
            }
        };
        println!("Seed user: {} / {}", email, password);

        let mut inserted = 0u32;
        let mut skipped = 0u32;
        for i in 0..count {
            let lead = random_lead(i);
            match repo.create_lead(&user.id, &lead).await {
                Ok(_) => inserted += 1,
                Err(DataError::Conflict(_)) => skipped += 1,
                Err(e) => return Err(e.into()),
            }
        }

        if skipped > 0 {
            println!("Seeded {} leads ({} duplicates skipped)", inserted, skipped);
        } else {
            println!("Seeded {} leads", inserted);
        }

        database.checkpoint().await?;
        database.close().await;
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", CRATE_TARGET);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        tracing::info!(
            data_dir = %app.storage.data_dir().display(),
            database = %app.storage.database_path().display(),
            frontend_origin = %app.config.cors.frontend_origin,
            "Starting {} v{}",
            crate::core::constants::SERVICE_NAME,
            env!("CARGO_PKG_VERSION")
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&self) {
        self.shutdown
            .register(
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        tracing::debug!("Background tasks started");
    }
}

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Linus", "Margaret", "Dennis", "Barbara", "Ken", "Radia", "Donald",
    "Frances", "John", "Hedy", "Tim", "Katherine", "Guido",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Torvalds", "Hamilton", "Ritchie", "Liskov", "Thompson",
    "Perlman", "Knuth", "Allen", "McCarthy", "Lamarr", "Berners-Lee", "Johnson", "van Rossum",
];
const COMPANIES: &[&str] = &[
    "Acme Corp", "Globex", "Initech", "Umbrella", "Hooli", "Stark Industries", "Wayne Enterprises",
    "Soylent", "Cyberdyne", "Wonka Industries",
];
const LOCATIONS: &[(&str, &str)] = &[
    ("Austin", "Texas"),
    ("Denver", "Colorado"),
    ("Portland", "Oregon"),
    ("Boston", "Massachusetts"),
    ("Chicago", "Illinois"),
    ("Seattle", "Washington"),
    ("Miami", "Florida"),
    ("Phoenix", "Arizona"),
];

fn pick<'a>(rng: &mut impl Rng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Random but plausible lead; the index keeps emails unique within a run
fn random_lead(index: u32) -> NewLead {
    const YEAR_MILLIS: i64 = 365 * 24 * 60 * 60 * 1000;

    let mut rng = rand::thread_rng();
    let first = pick(&mut rng, FIRST_NAMES);
    let last = pick(&mut rng, LAST_NAMES);
    let company = pick(&mut rng, COMPANIES);
    let (city, state) = LOCATIONS.choose(&mut rng).copied().unwrap_or(("Austin", "Texas"));
    let local_part = format!("{}.{}", first, last.replace([' ', '-'], "")).to_lowercase();
    let domain = company.replace(' ', "").to_lowercase();

    NewLead {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}_{}{}@{}.com", index, local_part, rng.gen_range(10..1000), domain),
        phone: Some(format!(
            "+1-{}-{}-{:04}",
            rng.gen_range(200..1000),
            rng.gen_range(200..1000),
            rng.gen_range(0..10_000)
        )),
        company: Some(company.to_string()),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        source: *LeadSource::ALL.choose(&mut rng).unwrap_or(&LeadSource::Other),
        status: *LeadStatus::ALL.choose(&mut rng).unwrap_or(&LeadStatus::New),
        score: rng.gen_range(0..=100),
        lead_value: (rng.gen_range(0.0..10_000.0_f64) * 100.0).round() / 100.0,
        last_activity_at: Some(now_millis() - rng.gen_range(0..YEAR_MILLIS)),
        is_qualified: rng.gen_bool(0.5),
    }
}
