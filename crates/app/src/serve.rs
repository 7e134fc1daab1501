use std::io::Read;

use environment::SimEnv;
use environment::service::{self, Reply};
use log::{info, warn};
use tiny_http::{Header, Request, Response, Server};

/// Serves requests one at a time against a single environment.
pub fn run(addr: &str, mut env: SimEnv) -> Result<(), Box<dyn std::error::Error>> {
    let server = Server::http(addr).map_err(|e| format!("Failed to bind {addr}: {e}"))?;
    info!("Listening on http://{addr}");

    for mut request in server.incoming_requests() {
        let mut body = String::new();
        if let Err(e) = request.as_reader().read_to_string(&mut body) {
            warn!("Failed to read request body: {e}");
            let reply = Reply {
                status: 400,
                body: String::from(r#"{"error":"unreadable body"}"#),
            };
            respond(request, reply);
            continue;
        }
        let method = request.method().as_str().to_string();
        let reply = service::handle(&mut env, &method, request.url(), &body);
        respond(request, reply);
    }
    Ok(())
}

fn respond(request: Request, reply: Reply) {
    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        warn!("Failed to send response: {e}");
    }
}
