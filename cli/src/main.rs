use std::io::Read;

use clap::{Parser, Subcommand};
use messages::ProductId;
use messages::analysis::{Analysis, NdjsonDecoder, StreamEvent};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, SET_COOKIE};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("proxy returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("analysis stream failed: {0}")]
    Analysis(String),
}

#[derive(Parser, Debug)]
#[command(name = "cartctl", about = "Cart relay proxy CLI")]
struct Cli {
    #[arg(long, env = "CARTRELAY_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Raw `Cookie` header forwarded to the proxy, e.g. the store session.
    #[arg(long, env = "CARTRELAY_COOKIE")]
    cookie: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    /// Add a product to the store cart through the proxy.
    Add {
        product_id: ProductId,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Current cart count and total.
    Cart,
    /// Refreshed storefront fragments.
    Fragments,
    /// List the catalog, or show one product.
    Spices { product_id: Option<ProductId> },
    /// Decode a saved NDJSON analysis stream.
    Analyze {
        #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
        input: String,
    },
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    cookie: Option<String>,
}

impl CliContext {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, cookie: cli.cookie };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Add { product_id, quantity } => {
            let form = [("productId", product_id.to_string()), ("quantity", quantity.to_string())];
            let value = api_request(&ctx, reqwest::Method::POST, "/add-to-cart", Some(&form[..])).await?;
            print_json(&value)
        }
        Command::Cart => print_json(&api_request(&ctx, reqwest::Method::GET, "/cart/get", None).await?),
        Command::Fragments => print_json(&api_request(&ctx, reqwest::Method::POST, "/cart/fragments", None).await?),
        Command::Spices { product_id } => {
            let path = spices_path(product_id);
            print_json(&api_request(&ctx, reqwest::Method::GET, &path, None).await?)
        }
        Command::Analyze { input } => run_analyze(&input),
    }
}

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    let client = reqwest::Client::new();
    let response = client.get(ctx.url("/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

fn spices_path(product_id: Option<ProductId>) -> String {
    match product_id {
        Some(id) => format!("/spices/{id}"),
        None => "/spices".to_owned(),
    }
}

async fn api_request(
    ctx: &CliContext,
    method: reqwest::Method,
    path: &str,
    form: Option<&[(&str, String)]>,
) -> Result<Value, CliError> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = ctx.cookie.as_deref() {
        headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
    }

    let client = reqwest::Client::builder().default_headers(headers).build()?;
    let request = client.request(method, ctx.url(path));
    let request = if let Some(form) = form { request.form(form) } else { request };

    let response = request.send().await?;
    let status = response.status();
    for cookie in set_cookies(response.headers()) {
        eprintln!("set-cookie: {cookie}");
    }
    let body = response.text().await?;
    let value = if body.trim().is_empty() { Value::Null } else { serde_json::from_str::<Value>(&body)? };

    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: error_message(&value) });
    }
    Ok(value)
}

fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_owned)
        .collect()
}

fn error_message(body: &Value) -> String {
    let message = body.get("message").and_then(Value::as_str).unwrap_or("request failed");
    match body.get("code").and_then(Value::as_str) {
        Some(code) => format!("{message} ({code})"),
        None => message.to_owned(),
    }
}

fn run_analyze(input: &str) -> Result<(), CliError> {
    let mut raw = Vec::new();
    if input == "-" {
        std::io::stdin().read_to_end(&mut raw)?;
    } else {
        raw = std::fs::read(input)?;
    }
    print_json(&decode_analysis(&raw)?)
}

/// Runs a whole NDJSON stream through the decoder and returns the final
/// analysis as JSON. Prose recipes gain a recommended `spice`.
fn decode_analysis(raw: &[u8]) -> Result<Value, CliError> {
    let mut decoder = NdjsonDecoder::new();
    let mut last = None;
    for event in decoder.push(raw) {
        match event {
            StreamEvent::Partial(text) => eprintln!("partial: {} chars", text.chars().count()),
            StreamEvent::Failed(message) => return Err(CliError::Analysis(message)),
            StreamEvent::Completed(analysis) => last = Some(analysis),
        }
    }
    match decoder.finish() {
        Some(StreamEvent::Failed(message)) => return Err(CliError::Analysis(message)),
        Some(StreamEvent::Completed(analysis)) => last = Some(analysis),
        Some(StreamEvent::Partial(_)) | None => {}
    }
    match last {
        Some(Analysis::Text { recipes }) => Ok(json!({
            "recipes": recipes
                .iter()
                .map(|recipe| json!({
                    "title": recipe.title,
                    "ingredients": recipe.ingredients,
                    "steps": recipe.steps,
                    "spice": recipe.recommended_spice(),
                }))
                .collect::<Vec<_>>(),
        })),
        Some(analysis) => Ok(serde_json::to_value(analysis)?),
        None => Ok(json!(null)),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
