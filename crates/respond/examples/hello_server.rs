//! Minimal server loop exercising the response layer end to end.
//!
//! ```text
//! cargo run --example hello_server
//! curl -i http://127.0.0.1:8080/
//! curl -i http://127.0.0.1:8080/json
//! curl -i http://127.0.0.1:8080/report
//! ```

use std::sync::Arc;

use cinder_respond::{ResponseWriter, StatusTable, wire::BufferedSink};
use serde_json::json;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::{TcpListener, TcpStream},
};
use uhrapi::{RequestHead, StatusCode};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let table = Arc::new(StatusTable::default());
    let listener = TcpListener::bind("127.0.0.1:8080").await?;
    log::info!("listening on {}", listener.local_addr()?);

    loop {
        let (stream, _) = listener.accept().await?;
        let table = table.clone();
        tokio::spawn(async move {
            if let Err(err) = handle(stream, table).await {
                log::error!("connection error: {err}");
            }
        });
    }
}

async fn handle(mut stream: TcpStream, table: Arc<StatusTable>) -> std::io::Result<()> {
    let mut reader = BufReader::new(&mut stream);
    let mut line = String::new();
    reader.read_line(&mut line).await?;

    // drain the header section, the routes below never look at it
    let mut header_line = String::new();
    loop {
        header_line.clear();
        reader.read_line(&mut header_line).await?;
        if header_line.trim_ascii_end().is_empty() {
            break;
        }
    }

    let mut writer = match RequestHead::parse(&line) {
        Ok(head) => {
            log::info!("{} {}", head.method, head.target);
            ResponseWriter::with_request(BufferedSink::new(), table, head)
        }
        Err(_) => {
            let mut writer = ResponseWriter::new(BufferedSink::new(), table);
            writer.error(StatusCode::BAD_REQUEST, None);
            writer.into_sink().write_to(&mut stream).await?;
            return Ok(());
        }
    };

    let target = writer
        .request()
        .map(|head| head.target.clone())
        .unwrap_or_default();
    match target.as_str() {
        "/" => writer.render("<h1>cinder</h1><p>response layer demo</p>"),
        "/json" => writer.send_success(json!({"service": "hello", "up": true})),
        "/report" => writer.sendfile("id,count\n1,2\n", "report.csv"),
        "/docs" => writer.redirect("example.com/docs", false),
        _ => writer.error(StatusCode::NOT_FOUND, None),
    }

    writer.into_sink().write_to(&mut stream).await
}
