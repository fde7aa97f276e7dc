// src/handlers/status.rs
use super::ProbeContext;
use crate::probes::{DatabaseStatus, FilesystemStatus, HostIdentity};
use chrono::Utc;
use hyper::{header, Body, Response, StatusCode};

/// `GET /`: the human-readable status page. Both checks always run; a
/// database failure never skips the filesystem check or vice versa, and the
/// page itself is always served with 200.
pub async fn page(probes: &ProbeContext) -> Response<Body> {
    let identity = HostIdentity::resolve().await;
    let database = probes.database.check().await;
    let filesystem = probes.filesystem.check().await;

    let html = render_page(&identity, &database, &filesystem);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(Body::from(html))
        .unwrap()
}

fn render_page(
    identity: &HostIdentity,
    database: &DatabaseStatus,
    filesystem: &FilesystemStatus,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Infrastructure Status</title>
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; }}
        h1 {{ color: #FF9900; }}
        .status-box {{ background: #f0f0f0; padding: 15px; margin: 10px 0; border-radius: 5px; }}
        .success {{ color: green; font-weight: bold; }}
        .warning {{ color: #b8860b; font-weight: bold; }}
        .error {{ color: red; font-weight: bold; }}
        .info {{ color: #0066cc; }}
    </style>
</head>
<body>
    <h1>Three-Tier Deployment</h1>
    <h2>Infrastructure Verification</h2>

    <div class="status-box">
        <h3>Application Tier</h3>
        <p><strong>Instance:</strong> {hostname}</p>
        <p><strong>Private IP:</strong> {ip}</p>
        <p><strong>Time:</strong> {time}</p>
        <p class="success">Probe server is running</p>
    </div>

    <div class="status-box">
        <h3>Database Tier</h3>
        {database}
    </div>

    <div class="status-box">
        <h3>Storage Tier</h3>
        {filesystem}
    </div>

    <div class="status-box">
        <h3>Load Balancer</h3>
        <p class="success">Successfully reached via the load balancer</p>
        <p class="info">This page was served through the application load balancer</p>
    </div>
</body>
</html>
"#,
        hostname = escape(&identity.hostname),
        ip = escape(&identity.ip),
        time = Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        database = database_fragment(database),
        filesystem = filesystem_fragment(filesystem),
    )
}

fn database_fragment(status: &DatabaseStatus) -> String {
    match status {
        DatabaseStatus::Connected {
            server_version,
            host,
            database,
        } => format!(
            "<p class=\"success\">Connected to MySQL {}</p>\
             <p class=\"info\">Host: {}</p>\
             <p class=\"info\">Database: {}</p>",
            escape(server_version),
            escape(host),
            escape(database),
        ),
        DatabaseStatus::Failed { error } => format!(
            "<p class=\"error\">Database connection failed: {}</p>",
            escape(&error.to_string()),
        ),
    }
}

fn filesystem_fragment(status: &FilesystemStatus) -> String {
    match status {
        FilesystemStatus::Writable { path } => format!(
            "<p class=\"success\">Shared filesystem mounted and writable</p>\
             <p class=\"info\">Path: {}</p>",
            escape(&path.display().to_string()),
        ),
        FilesystemStatus::Mounted { path } => format!(
            "<p class=\"success\">Shared filesystem mounted</p>\
             <p class=\"info\">Path: {}</p>",
            escape(&path.display().to_string()),
        ),
        FilesystemStatus::NotMounted { path } => format!(
            "<p class=\"warning\">Path is not a mount point: {}</p>",
            escape(&path.display().to_string()),
        ),
        FilesystemStatus::Failed { error } => format!(
            "<p class=\"error\">Filesystem check failed: {}</p>",
            escape(&error.to_string()),
        ),
    }
}

/// Check failures embed driver error text in the page, so it has to be
/// escaped before it lands in the markup.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
