use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::configuration::{ApplicationSettings, SecretSetting, Settings};
use crate::mollie_client::{MollieApiClient, MollieGateway};
use crate::openapi::ApiDoc;
use crate::order_store::{InMemoryOrderStore, OrderStore};
use crate::routes::main_route;
use crate::routes::payment::utils::WebhookDedup;
use crate::setting_service::SettingService;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let gateway: Arc<dyn MollieGateway> = Arc::new(MollieApiClient::new(
            configuration.mollie.base_url.clone(),
            configuration.mollie.timeout(),
        )?);
        let order_store: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
        Self::build_with_dependencies(configuration, gateway, order_store).await
    }

    /// Wires the application around externally supplied collaborators; the
    /// integration tests substitute a stub gateway and a seeded order store.
    pub async fn build_with_dependencies(
        configuration: Settings,
        gateway: Arc<dyn MollieGateway>,
        order_store: Arc<dyn OrderStore>,
    ) -> Result<Self, anyhow::Error> {
        // plugin install: seed the settings record with the defaults
        let setting_service = SettingService::new();
        setting_service.install(configuration.plugin.clone().into());

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        tracing::info!(%address, "Starting the Mollie payments adapter.");
        let server = run(
            listener,
            gateway,
            order_store,
            setting_service,
            configuration.application,
            configuration.secret,
        )
        .await?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    // Only returns when the application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

async fn run(
    listener: TcpListener,
    gateway: Arc<dyn MollieGateway>,
    order_store: Arc<dyn OrderStore>,
    setting_service: SettingService,
    application_settings: ApplicationSettings,
    secret: SecretSetting,
) -> Result<Server, anyhow::Error> {
    let gateway = web::Data::new(gateway);
    let order_store = web::Data::new(order_store);
    let setting_service = web::Data::new(setting_service);
    let application_settings = web::Data::new(application_settings);
    let secret = web::Data::new(secret);
    let webhook_dedup = web::Data::new(WebhookDedup::new());
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(gateway.clone())
            .app_data(order_store.clone())
            .app_data(setting_service.clone())
            .app_data(application_settings.clone())
            .app_data(secret.clone())
            .app_data(webhook_dedup.clone())
            .service(
                SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
            .configure(main_route)
    })
    .workers(4)
    .listen(listener)?
    .run();

    Ok(server)
}
