use std::sync::Arc;
use std::time::Duration;

use actix_web::{get, web, App, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use bookgraph_agent::agent::ToolAgent;
use bookgraph_agent::catalog::GraphCatalog;
use bookgraph_agent::config::AppConfig;
use bookgraph_agent::domain::Book;
use bookgraph_agent::error::ApiError;
use bookgraph_agent::graph::GraphStore;
use bookgraph_agent::mcp::client::discover_tools;
use bookgraph_agent::mcp::mcp_server::run_mcp_server;
use bookgraph_agent::registry::{ToolOrigin, ToolRegistry};
use bookgraph_agent::service::RetrievalService;
use bookgraph_agent::template::TemplateEngine;
use bookgraph_agent::tools::register_static_tools;
use bookgraph_agent::vector::FulltextReviewIndex;
use bookgraph_agent::DEFAULT_USER_ID;

const DISCOVERY_ATTEMPTS: usize = 3;
const DISCOVERY_RETRY_DELAY: Duration = Duration::from_millis(500);

struct AppState {
    service: Arc<RetrievalService>,
    static_registry: Arc<ToolRegistry>,
    /// Static plus discovered tools; `None` when discovery failed at startup.
    full_registry: Option<Arc<ToolRegistry>>,
    agent: Arc<ToolAgent>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    /// User id; a demo placeholder is used when omitted.
    user_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
struct AgentQuery {
    /// User id; a demo placeholder is used when omitted.
    user_id: Option<String>,
    /// Free-text question for the agent.
    user_query: String,
}

#[derive(Serialize, ToSchema)]
struct CountResponse {
    count: u64,
}

#[derive(Serialize, ToSchema)]
struct AgentResponse {
    answer: String,
}

#[derive(Serialize, ToSchema)]
struct ToolListing {
    name: String,
    origin: String,
    description: String,
}

#[utoipa::path(
    get,
    path = "/books/five-star",
    responses(
        (status = 200, description = "Books with at least one 5-star review, most recently reviewed first", body = [Book]),
        (status = 502, description = "Graph store failure", body = bookgraph_agent::ErrorResponse)
    )
)]
#[get("/books/five-star")]
async fn five_star_books(state: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let books = state.service.highly_rated_books().await?;
    Ok(web::Json(books))
}

#[utoipa::path(
    get,
    path = "/books/recommendations",
    params(UserQuery),
    responses(
        (status = 200, description = "Well-rated books the user has not read", body = [Book]),
        (status = 502, description = "Graph store failure", body = bookgraph_agent::ErrorResponse)
    )
)]
#[get("/books/recommendations")]
async fn recommendations(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, ApiError> {
    let books = state
        .service
        .quality_recommendations(query.user_id.as_deref())
        .await?;
    Ok(web::Json(books))
}

#[utoipa::path(
    get,
    path = "/books/read-count",
    params(UserQuery),
    responses(
        (status = 200, description = "Number of distinct books the user has reviewed", body = CountResponse),
        (status = 502, description = "Graph store failure", body = bookgraph_agent::ErrorResponse)
    )
)]
#[get("/books/read-count")]
async fn read_count(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> Result<impl Responder, ApiError> {
    let count = state.service.count_books_read(query.user_id.as_deref()).await?;
    Ok(web::Json(CountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/agent/query",
    params(AgentQuery),
    responses(
        (status = 200, description = "Agent answer produced with the fixed tool set", body = AgentResponse),
        (status = 400, description = "Empty query", body = bookgraph_agent::ErrorResponse),
        (status = 502, description = "Chat or tool failure", body = bookgraph_agent::ErrorResponse)
    )
)]
#[get("/agent/query")]
async fn agent_query(
    state: web::Data<AppState>,
    query: web::Query<AgentQuery>,
) -> Result<impl Responder, ApiError> {
    let query = query.into_inner();
    if query.user_query.trim().is_empty() {
        return Err(ApiError::bad_request("userQuery must not be empty"));
    }

    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);
    let system_prompt = TemplateEngine::render_agent_prompt(user_id);

    let answer = state
        .agent
        .answer(&system_prompt, &query.user_query, &state.static_registry)
        .await?;
    Ok(web::Json(AgentResponse { answer }))
}

#[utoipa::path(
    get,
    path = "/agent/mcp/query",
    params(AgentQuery),
    responses(
        (status = 200, description = "Agent answer produced with static plus MCP-discovered tools", body = AgentResponse),
        (status = 400, description = "Empty query", body = bookgraph_agent::ErrorResponse),
        (status = 502, description = "Chat or tool failure", body = bookgraph_agent::ErrorResponse),
        (status = 503, description = "Tool discovery failed at startup", body = bookgraph_agent::ErrorResponse)
    )
)]
#[get("/agent/mcp/query")]
async fn agent_mcp_query(
    state: web::Data<AppState>,
    query: web::Query<AgentQuery>,
) -> Result<impl Responder, ApiError> {
    let query = query.into_inner();
    if query.user_query.trim().is_empty() {
        return Err(ApiError::bad_request("userQuery must not be empty"));
    }

    let registry = state
        .full_registry
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("MCP tool discovery failed at startup"))?;

    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER_ID);
    let system_prompt = TemplateEngine::render_mcp_agent_prompt(user_id);

    let answer = state
        .agent
        .answer(&system_prompt, &query.user_query, registry)
        .await?;
    Ok(web::Json(AgentResponse { answer }))
}

#[utoipa::path(
    get,
    path = "/agent/mcp/tools",
    responses(
        (status = 200, description = "Tools available to the MCP-backed agent, with their origin", body = [ToolListing]),
        (status = 503, description = "Tool discovery failed at startup", body = bookgraph_agent::ErrorResponse)
    )
)]
#[get("/agent/mcp/tools")]
async fn agent_mcp_tools(state: web::Data<AppState>) -> Result<impl Responder, ApiError> {
    let registry = state
        .full_registry
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("MCP tool discovery failed at startup"))?;

    let listing: Vec<ToolListing> = registry
        .iter()
        .map(|(origin, spec)| ToolListing {
            name: spec.name.clone(),
            origin: match origin {
                ToolOrigin::Static => "static".to_string(),
                ToolOrigin::Discovered => "discovered".to_string(),
            },
            description: spec.description.clone(),
        })
        .collect();
    Ok(web::Json(listing))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        five_star_books,
        recommendations,
        read_count,
        agent_query,
        agent_mcp_query,
        agent_mcp_tools
    ),
    components(schemas(
        Book,
        bookgraph_agent::Author,
        bookgraph_agent::Review,
        CountResponse,
        AgentResponse,
        ToolListing,
        bookgraph_agent::ErrorResponse
    ))
)]
struct ApiDoc;

/// Queries the MCP endpoint for its tool set, retrying a few times to give
/// the freshly spawned server a chance to bind.
async fn discover_with_retries(server_url: &str) -> Option<Vec<bookgraph_agent::ToolSpec>> {
    for attempt in 1..=DISCOVERY_ATTEMPTS {
        match discover_tools(server_url).await {
            Ok(specs) => return Some(specs),
            Err(e) => {
                tracing::warn!("tool discovery attempt {attempt}/{DISCOVERY_ATTEMPTS} failed: {e}");
                tokio::time::sleep(DISCOVERY_RETRY_DELAY).await;
            }
        }
    }
    None
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_max_level(tracing::Level::INFO).init();

    let config = AppConfig::from_env();
    tracing::info!(
        "connecting to {} (graph '{}')",
        config.falkordb_connection,
        config.graph_name
    );

    let store = GraphStore::connect(&config.falkordb_connection, &config.graph_name)
        .await
        .map_err(std::io::Error::other)?;

    let service = Arc::new(RetrievalService::new(
        Arc::new(GraphCatalog::new(store.clone())),
        Arc::new(FulltextReviewIndex::new(store.clone()).with_top_k(config.search_top_k)),
    ));

    let mut static_registry = ToolRegistry::new();
    register_static_tools(&mut static_registry, service.clone()).map_err(std::io::Error::other)?;
    tracing::info!("registered {} static tool(s)", static_registry.len());

    // In-process MCP server exposing the graph-query tools.
    let mcp_store = store.clone();
    let mcp_port = config.mcp_port;
    tokio::spawn(async move {
        if let Err(e) = run_mcp_server(mcp_port, mcp_store).await {
            tracing::error!("MCP server terminated: {e}");
        }
    });

    // Discover the MCP tool set back into a second registry. Static tools
    // win on name collisions. Failure leaves the dynamic endpoints at 503
    // rather than aborting startup.
    let full_registry = match discover_with_retries(&config.mcp_server_url).await {
        Some(specs) => {
            let mut registry = static_registry.clone();
            for spec in specs {
                registry.register_discovered(spec);
            }
            tracing::info!("dynamic registry holds {} tool(s)", registry.len());
            Some(Arc::new(registry))
        }
        None => {
            tracing::error!(
                "tool discovery from {} failed; /agent/mcp endpoints will answer 503",
                config.mcp_server_url
            );
            None
        }
    };

    let agent = Arc::new(ToolAgent::new(config.model.clone(), config.api_key.clone()));
    tracing::info!("agent driver model: {}", agent.model());

    let state = web::Data::new(AppState {
        service,
        static_registry: Arc::new(static_registry),
        full_registry,
        agent,
    });

    tracing::info!(
        "starting server at http://localhost:{}/swagger-ui/",
        config.http_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(five_star_books)
            .service(recommendations)
            .service(read_count)
            .service(agent_query)
            .service(agent_mcp_query)
            .service(agent_mcp_tools)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind(("127.0.0.1", config.http_port))?
    .run()
    .await
}
