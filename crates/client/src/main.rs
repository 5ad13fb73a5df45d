use clap::{Parser, Subcommand};
use common::{
    ErrorResponse, HealthResponse, MessageResponse, SetStatusRequest, StatusMap, StatusResponse,
    API_KEY_HEADER,
};
use reqwest::{Client, RequestBuilder, Response, Url};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the status service
    #[arg(long, env = "STATUS_URL", default_value = "http://localhost:3030")]
    url: String,

    /// API key sent with every protected request
    #[arg(long, env = "STATUS_API_KEY")]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the status of a machine
    Set {
        machine_id: String,
        /// active, free or unknown
        status: String,
        /// Unix timestamp in seconds (default: server time)
        #[arg(long)]
        timestamp: Option<i64>,
    },
    /// Show the latest status of a machine
    Get {
        machine_id: String,
    },
    /// List every known machine
    List,
    /// Check that the service is up
    Health,
}

/// Builds requests against one service instance.
struct Api {
    client: Client,
    base: Url,
    api_key: Option<String>,
}

impl Api {
    fn new(base: &str, api_key: Option<String>) -> Result<Self> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(format!("{} cannot be used as a base URL", base).into());
        }
        Ok(Self {
            client: Client::new(),
            base,
            api_key,
        })
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded,
    /// so `/`, `?` and `#` inside a machine id stay part of the id.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.header(API_KEY_HEADER, key),
            None => req,
        }
    }

    fn set_status(&self, body: &SetStatusRequest) -> RequestBuilder {
        let req = self.authed(self.client.post(self.endpoint(&["status"])));
        req.json(body)
    }

    fn get_status(&self, machine_id: &str) -> RequestBuilder {
        self.authed(self.client.get(self.endpoint(&["status", machine_id])))
    }

    fn list_statuses(&self) -> RequestBuilder {
        self.authed(self.client.get(self.endpoint(&["status"])))
    }

    fn health(&self) -> RequestBuilder {
        self.client.get(self.endpoint(&["health"]))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = Api::new(&cli.url, cli.api_key)?;

    match cli.command {
        Commands::Set { machine_id, status, timestamp } => {
            let req = SetStatusRequest {
                machine_id: machine_id.clone(),
                status,
                timestamp,
            };
            let resp = api.set_status(&req).send().await?;

            let resp = check(resp, "update status").await;
            let msg: MessageResponse = resp.json().await?;
            println!("{}: {}", machine_id, msg.message);
        }
        Commands::Get { machine_id } => {
            let resp = api.get_status(&machine_id).send().await?;

            let resp = check(resp, "get status").await;
            let status: StatusResponse = resp.json().await?;
            println!("{} {} {}", status.device_id, status.status, status.timestamp);
        }
        Commands::List => {
            let resp = api.list_statuses().send().await?;

            let resp = check(resp, "list statuses").await;
            let all: StatusMap = resp.json().await?;
            let mut entries: Vec<_> = all.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));

            println!("Known machines: {}", entries.len());
            for (machine_id, entry) in entries {
                println!("{} {} {}", machine_id, entry.status, entry.timestamp);
            }
        }
        Commands::Health => {
            let resp = api.health().send().await?;

            let resp = check(resp, "check health").await;
            let health: HealthResponse = resp.json().await?;
            println!("{}", if health.ok { "ok" } else { "not ok" });
        }
    }

    Ok(())
}

/// Passes successful responses through; otherwise prints the server's
/// detail and exits with status 1.
async fn check(resp: Response, action: &str) -> Response {
    if resp.status().is_success() {
        return resp;
    }

    let status = resp.status();
    match resp.json::<ErrorResponse>().await {
        Ok(err) => eprintln!("Failed to {}: {} ({})", action, err.detail, status),
        Err(_) => eprintln!("Failed to {}: {}", action, status),
    }
    std::process::exit(1);
}
