use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use latrones_client::protocol::{OutgoingRequest, RequestId, WireRequest};
use log::debug;
use url::Url;


pub struct ServerResponse {
    pub id: RequestId,
    pub body: Result<String, String>,
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(server_address: &str, timeout: Duration) -> anyhow::Result<Self> {
        let address = if server_address.contains("://") {
            server_address.to_owned()
        } else {
            format!("http://{server_address}")
        };
        let base_url =
            Url::parse(&address).with_context(|| format!("Bad server address: {address}"))?;
        let client = reqwest::Client::builder()
            .user_agent("LatronesConsole/0.1")
            .timeout(timeout)
            .build()?;
        Ok(HttpTransport { client, base_url })
    }

    pub async fn fetch_page(&self) -> anyhow::Result<String> {
        let response = self.client.get(self.base_url.clone()).send().await?;
        read_body(response).await
    }

    pub async fn post(&self, request: &WireRequest) -> anyhow::Result<String> {
        let url = self.base_url.join(&request.path)?;
        debug!("POST {url} ({} fields)", request.fields.len());
        let response = self.client.post(url).form(&request.fields).send().await?;
        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> anyhow::Result<String> {
    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {status}");
    }
    Ok(response.text().await?)
}

// Performs requests one by one, in order, on a dedicated thread.
pub fn spawn_transport<E: Send + 'static>(
    transport: HttpTransport, requests_rx: mpsc::Receiver<OutgoingRequest>,
    events_tx: mpsc::Sender<E>, wrap: fn(ServerResponse) -> E,
) {
    thread::spawn(move || {
        for request in requests_rx {
            let wire = request.to_wire();
            let body = async_std::task::block_on(transport.post(&wire))
                .map_err(|err| format!("{err:#}"));
            if events_tx.send(wrap(ServerResponse { id: request.id, body })).is_err() {
                break;
            }
        }
    });
}
