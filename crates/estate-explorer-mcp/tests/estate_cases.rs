//! Integration tests for estate-explorer-mcp.
//!
//! Drives the protocol handler end to end over a small on-disk artifact set.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use estate_explorer::{ArtifactStore, EstateResult, FeatureRow, PricePipeline, UnavailablePipeline};
use estate_explorer_mcp::config::ScoringConfig;
use estate_explorer_mcp::protocol::ProtocolHandler;
use estate_explorer_mcp::session::EstateSession;
use estate_explorer_mcp::transport::StdioTransport;
use estate_explorer_mcp::types::*;

// ─────────────────────── helpers ───────────────────────

const REFERENCE: &str = "\
property_type,sector,price,bedRoom,bathroom,balcony,agePossession,built_up_area,servant room,store room,furnishing_type,luxury_category,floor_category
flat,sector 45,1.2,3.0,3.0,3+,New Property,1650,0.0,0.0,semifurnished,Medium,Mid Floor
flat,sector 65,2.4,4.0,4.0,2,Relatively New,2400,1.0,0.0,furnished,High,High Floor
house,sohna road,3.1,2.0,2.0,1,Under Construction,900,0.0,1.0,unfurnished,Low,Low Floor
";

const DISTANCES: &str = "\
property_name,Cyber Hub,Airport
Property X,500,12000
Property Y,1500,
Property Z,2500,9000
";

const SIM1: &str = "\
property_name,Property X,Property Y,Property Z
Property X,1.0,0.2,0.1
Property Y,0.2,1.0,0.4
Property Z,0.1,0.4,1.0
";

const SIM2: &str = "\
property_name,Property X,Property Y,Property Z
Property X,1.0,0.5,0.3
Property Y,0.5,1.0,0.2
Property Z,0.3,0.2,1.0
";

const SIM3: &str = "\
property_name,Property X,Property Y,Property Z
Property X,1.0,0.6,0.9
Property Y,0.6,1.0,0.7
Property Z,0.9,0.7,1.0
";

const MARKET: &str = "\
property_type,sector,price,price_per_sqft,built_up_area,bedRoom,latitude,longitude
flat,sector 45,1.0,10000,1000,2,28.40,77.00
flat,sector 45,2.0,12000,1600,3,28.42,77.02
house,sector 65,6.0,25000,2400,5,28.52,77.12
";

/// Pipeline returning a fixed log price and counting calls.
struct FixedPipeline {
    log_price: f64,
    calls: AtomicUsize,
}

impl FixedPipeline {
    /// Pipeline whose back-transformed price is exactly `price`.
    fn pricing(price: f64) -> Self {
        Self {
            log_price: price.ln_1p(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl PricePipeline for FixedPipeline {
    fn predict(&self, row: &FeatureRow) -> EstateResult<f64> {
        assert_eq!(row.len(), 12);
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.log_price)
    }
}

fn write_artifacts(dir: &Path, with_market: bool) {
    let files = [
        ("reference.csv", REFERENCE),
        ("location_distance.csv", DISTANCES),
        ("cosine_sim1.csv", SIM1),
        ("cosine_sim2.csv", SIM2),
        ("cosine_sim3.csv", SIM3),
    ];
    for (name, body) in files {
        std::fs::write(dir.join(name), body).unwrap();
    }
    if with_market {
        std::fs::write(dir.join("data_viz.csv"), MARKET).unwrap();
        std::fs::write(dir.join("feature_text.txt"), "gym pool gym lift pool gym").unwrap();
    }
}

/// Handler over a temp artifact directory and the given pipeline.
fn handler_with(
    dir: &tempfile::TempDir,
    with_market: bool,
    pipeline: Arc<dyn PricePipeline>,
) -> ProtocolHandler {
    write_artifacts(dir.path(), with_market);
    let store = ArtifactStore::load(dir.path()).unwrap();
    let session = EstateSession::new(Arc::new(store), pipeline, ScoringConfig::default());
    ProtocolHandler::new(Arc::new(session))
}

fn handler(dir: &tempfile::TempDir) -> ProtocolHandler {
    handler_with(dir, true, Arc::new(FixedPipeline::pricing(2.0)))
}

/// Build an MCP JSON-RPC request.
fn mcp_request(id: i64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params
    })
}

/// Build an initialize request.
fn init_request() -> Value {
    mcp_request(
        0,
        "initialize",
        json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": { "name": "test-client", "version": "1.0" }
        }),
    )
}

fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
    mcp_request(id, "tools/call", json!({ "name": name, "arguments": arguments }))
}

/// Send a JSON-RPC message through the handler and return the response.
async fn send(handler: &ProtocolHandler, msg: Value) -> Option<Value> {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    handler.handle_message(parsed).await
}

/// Send and unwrap the response.
async fn send_unwrap(handler: &ProtocolHandler, msg: Value) -> Value {
    send(handler, msg).await.expect("expected response")
}

/// Parse the JSON body of a successful tool call.
fn tool_body(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("no text content in {response}"));
    serde_json::from_str(text).unwrap()
}

/// Parse the JSON body of a resource read.
fn resource_body(response: &Value) -> Value {
    let text = response["result"]["contents"][0]["text"]
        .as_str()
        .unwrap_or_else(|| panic!("no resource text in {response}"));
    serde_json::from_str(text).unwrap()
}

fn error_code(response: &Value) -> i64 {
    response["error"]["code"]
        .as_i64()
        .unwrap_or_else(|| panic!("expected error in {response}"))
}

fn estimate_args() -> Value {
    json!({
        "property_type": "flat",
        "sector": "sector 45",
        "bedrooms": 3,
        "bathrooms": 3,
        "balcony": "3+",
        "age_possession": "New Property",
        "built_up_area": 1650,
        "store_room": true,
        "furnishing_type": "semifurnished",
        "luxury_category": "Medium",
        "floor_category": "Mid Floor"
    })
}

// ─────────────────────── handshake ───────────────────────

#[tokio::test]
async fn test_initialize_reports_server_info() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(&handler, init_request()).await;
    assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(resp["result"]["serverInfo"]["name"], "estate-explorer-mcp");
    assert!(resp["result"]["capabilities"]["tools"].is_object());

    let notif = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });
    assert!(send(&handler, notif).await.is_none());
    assert!(handler.capabilities().is_initialized());
    assert_eq!(handler.capabilities().client_name(), Some("test-client"));
}

#[tokio::test]
async fn test_unknown_method() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(&handler, mcp_request(1, "estate/teleport", json!({}))).await;
    assert_eq!(error_code(&resp), -32601);
}

#[tokio::test]
async fn test_tools_list_has_eight_tools() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(&handler, mcp_request(1, "tools/list", json!({}))).await;
    let names: Vec<&str> = resp["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 8);
    for expected in ["estimate_price", "search_nearby", "recommend_similar", "feature_terms"] {
        assert!(names.contains(&expected), "missing {expected}");
    }
}

// ─────────────────────── estimate_price ───────────────────────

#[tokio::test]
async fn test_estimate_price_band() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(&handler, tool_call(1, "estimate_price", estimate_args())).await;
    let body = tool_body(&resp);
    assert!((body["expected"].as_f64().unwrap() - 2.0).abs() < 1e-9);
    assert!((body["low"].as_f64().unwrap() - 1.78).abs() < 1e-9);
    assert!((body["high"].as_f64().unwrap() - 2.22).abs() < 1e-9);
    assert_eq!(body["unit"], "crore");
    assert!(body["summary"].as_str().unwrap().contains("1.78"));
}

#[tokio::test]
async fn test_estimate_unknown_sector_skips_model() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Arc::new(FixedPipeline::pricing(2.0));
    let handler = handler_with(&dir, true, pipeline.clone());

    let mut args = estimate_args();
    args["sector"] = json!("sector 999");
    let resp = send_unwrap(&handler, tool_call(1, "estimate_price", args)).await;

    assert_eq!(error_code(&resp), -32602);
    assert_eq!(pipeline.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_estimate_small_area_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let mut args = estimate_args();
    args["built_up_area"] = json!(120);
    let resp = send_unwrap(&handler, tool_call(1, "estimate_price", args)).await;
    assert_eq!(error_code(&resp), -32602);
}

#[tokio::test]
async fn test_estimate_missing_field_is_invalid_params() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(
        &handler,
        tool_call(1, "estimate_price", json!({ "property_type": "flat" })),
    )
    .await;
    assert_eq!(error_code(&resp), -32602);
}

#[tokio::test]
async fn test_estimate_without_model_is_estate_error() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler_with(
        &dir,
        true,
        Arc::new(UnavailablePipeline::new(dir.path().join("pipeline.onnx"))),
    );

    let resp = send_unwrap(&handler, tool_call(1, "estimate_price", estimate_args())).await;
    assert_eq!(error_code(&resp), -32852);
}

// ─────────────────────── search_nearby ───────────────────────

#[tokio::test]
async fn test_search_nearby_sorted_and_strict() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    // 1.5 km boundary: Property Y at exactly 1500 m is excluded.
    let resp = send_unwrap(
        &handler,
        tool_call(1, "search_nearby", json!({ "landmark": "Cyber Hub", "radius_km": 1.5 })),
    )
    .await;
    let body = tool_body(&resp);
    assert_eq!(body["found"], true);
    assert_eq!(body["total"], 1);
    assert_eq!(body["properties"][0]["property"], "Property X");

    let resp = send_unwrap(
        &handler,
        tool_call(2, "search_nearby", json!({ "landmark": "Cyber Hub", "radius_km": 10 })),
    )
    .await;
    let body = tool_body(&resp);
    let order: Vec<&str> = body["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["property"].as_str().unwrap())
        .collect();
    assert_eq!(order, vec!["Property X", "Property Y", "Property Z"]);
    assert_eq!(body["properties"][2]["distance_km"], 2.5);
}

#[tokio::test]
async fn test_search_nearby_empty_and_missing_distance() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(
        &handler,
        tool_call(1, "search_nearby", json!({ "landmark": "Airport", "radius_km": 5 })),
    )
    .await;
    let body = tool_body(&resp);
    assert_eq!(body["found"], false);
    assert_eq!(
        body["message"],
        "No apartments found within the selected radius."
    );

    // Property Y has no Airport distance and never matches.
    let resp = send_unwrap(
        &handler,
        tool_call(2, "search_nearby", json!({ "landmark": "Airport", "radius_km": 100 })),
    )
    .await;
    let body = tool_body(&resp);
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn test_search_nearby_unknown_landmark() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(
        &handler,
        tool_call(1, "search_nearby", json!({ "landmark": "Moon Base", "radius_km": 5 })),
    )
    .await;
    assert_eq!(error_code(&resp), -32602);
}

// ─────────────────────── recommend_similar ───────────────────────

#[tokio::test]
async fn test_recommend_weighted_order() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(
        &handler,
        tool_call(1, "recommend_similar", json!({ "property": "Property X", "top_n": 2 })),
    )
    .await;
    let body = tool_body(&resp);
    let recs = body["recommendations"].as_array().unwrap();
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["property"], "Property Z");
    assert_eq!(recs[0]["score"], 1.19);
    assert_eq!(recs[1]["property"], "Property Y");
    assert_eq!(recs[1]["score"], 1.1);
}

#[tokio::test]
async fn test_recommend_weights_override() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    // Name similarity alone favours Property Y.
    let resp = send_unwrap(
        &handler,
        tool_call(
            1,
            "recommend_similar",
            json!({
                "property": "Property X",
                "top_n": 1,
                "weights": { "name": 1.0, "location": 0.0, "facilities": 0.0 }
            }),
        ),
    )
    .await;
    let body = tool_body(&resp);
    assert_eq!(body["recommendations"][0]["property"], "Property Y");
}

#[tokio::test]
async fn test_recommend_zero_and_negative_top_n() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    for (id, n) in [(1, 0), (2, -3)] {
        let resp = send_unwrap(
            &handler,
            tool_call(id, "recommend_similar", json!({ "property": "Property X", "top_n": n })),
        )
        .await;
        assert_eq!(tool_body(&resp)["total"], 0);
    }
}

#[tokio::test]
async fn test_recommend_unknown_property() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(
        &handler,
        tool_call(1, "recommend_similar", json!({ "property": "Nowhere Manor" })),
    )
    .await;
    assert_eq!(error_code(&resp), -32602);
}

// ─────────────────────── market analytics ───────────────────────

#[tokio::test]
async fn test_market_tools() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(&handler, tool_call(1, "market_sectors", json!({}))).await;
    assert_eq!(tool_body(&resp)["total"], 2);

    let resp = send_unwrap(&handler, tool_call(2, "feature_terms", json!({ "top_k": 1 }))).await;
    let body = tool_body(&resp);
    assert_eq!(body["terms"][0]["term"], "gym");
    assert_eq!(body["terms"][0]["count"], 3);
}

#[tokio::test]
async fn test_market_tools_without_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler_with(&dir, false, Arc::new(FixedPipeline::pricing(1.0)));

    let resp = send_unwrap(&handler, tool_call(1, "market_sectors", json!({}))).await;
    assert_eq!(error_code(&resp), -32852);
}

#[tokio::test]
async fn test_unknown_tool() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(&handler, tool_call(1, "appraise_castle", json!({}))).await;
    assert_eq!(error_code(&resp), -32803);
}

// ─────────────────────── resources ───────────────────────

#[tokio::test]
async fn test_resources_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(
        &handler,
        mcp_request(1, "resources/read", json!({ "uri": "estate://landmarks" })),
    )
    .await;
    let text = resp["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(text.contains("Cyber Hub"));
    assert!(text.contains("Airport"));

    let resp = send_unwrap(
        &handler,
        mcp_request(2, "resources/read", json!({ "uri": "estate://stats" })),
    )
    .await;
    let stats = resource_body(&resp);
    assert_eq!(stats["properties"], 3);
    assert_eq!(stats["market_listings"], 3);
}

#[tokio::test]
async fn test_resource_templates() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(
        &handler,
        mcp_request(1, "resources/read", json!({ "uri": "estate://similar/Property%20X" })),
    )
    .await;
    let body = resource_body(&resp);
    assert_eq!(body["matches"][0]["property"], "Property Z");

    let resp = send_unwrap(
        &handler,
        mcp_request(2, "resources/read", json!({ "uri": "estate://nearby/Cyber%20Hub/1" })),
    )
    .await;
    let text = resp["result"]["contents"][0]["text"].as_str().unwrap();
    assert!(text.contains("Property X"));
    assert!(!text.contains("Property Z"));
}

#[tokio::test]
async fn test_unknown_resource() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(
        &handler,
        mcp_request(1, "resources/read", json!({ "uri": "estate://castles" })),
    )
    .await;
    assert_eq!(error_code(&resp), -32802);
}

// ─────────────────────── prompts ───────────────────────

#[tokio::test]
async fn test_prompts() {
    let dir = tempfile::tempdir().unwrap();
    let handler = handler(&dir);

    let resp = send_unwrap(&handler, mcp_request(1, "prompts/list", json!({}))).await;
    assert_eq!(resp["result"]["prompts"].as_array().unwrap().len(), 3);

    let resp = send_unwrap(
        &handler,
        mcp_request(
            2,
            "prompts/get",
            json!({ "name": "shortlist", "arguments": { "landmark": "Cyber Hub" } }),
        ),
    )
    .await;
    let text = resp["result"]["messages"][0]["content"]["text"].as_str().unwrap();
    assert!(text.contains("Cyber Hub"));

    let resp = send_unwrap(
        &handler,
        mcp_request(3, "prompts/get", json!({ "name": "shortlist" })),
    )
    .await;
    assert_eq!(error_code(&resp), -32602);

    let resp = send_unwrap(
        &handler,
        mcp_request(4, "prompts/get", json!({ "name": "sonnet" })),
    )
    .await;
    assert_eq!(error_code(&resp), -32804);
}

// ─────────────────────── transport ───────────────────────

#[tokio::test]
async fn test_stdio_serve_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let transport = StdioTransport::new(handler(&dir));

    let input = format!(
        "{}\n{}\n{}\n",
        init_request(),
        json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
        mcp_request(1, "ping", json!({})),
    );
    let mut output = Vec::new();
    transport.serve(input.as_bytes(), &mut output).await.unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    // The notification produces no response line.
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["id"], 1);
}

#[tokio::test]
async fn test_concurrent_requests_share_session() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Arc::new(FixedPipeline::pricing(2.0));
    let handler = Arc::new(handler_with(&dir, true, pipeline.clone()));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let handler = handler.clone();
            tokio::spawn(async move {
                send_unwrap(&handler, tool_call(i, "estimate_price", estimate_args())).await
            })
        })
        .collect();

    for task in tasks {
        let resp = task.await.unwrap();
        assert!(resp["result"].is_object());
    }
    assert_eq!(pipeline.calls.load(Ordering::SeqCst), 8);
}
