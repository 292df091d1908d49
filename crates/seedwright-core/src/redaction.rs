use serde::Serialize;

const SENSITIVE_PARAMS: &[&str] = &["password", "pass", "token", "api_key", "apikey"];

/// Connection target with secrets removed, safe to log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedactedConnection {
    pub engine: Option<String>,
    pub host: Option<String>,
    pub database: Option<String>,
    pub redacted: String,
}

/// Mask the password in the authority section and sensitive query params.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let Some((engine, rest)) = conn.split_once("://") else {
        return RedactedConnection {
            engine: None,
            host: None,
            database: None,
            redacted: redact_query(conn),
        };
    };

    let (authority, location) = match rest.rsplit_once('@') {
        Some((auth, location)) => (Some(auth), location),
        None => (None, rest),
    };
    let (location, query) = match location.split_once('?') {
        Some((location, query)) => (location, Some(query)),
        None => (location, None),
    };
    let (host_port, database) = match location.split_once('/') {
        Some((host_port, database)) => (host_port, Some(database)),
        None => (location, None),
    };

    let mut redacted = format!("{engine}://");
    if let Some(auth) = authority {
        match auth.split_once(':') {
            Some((user, _)) => redacted.push_str(&format!("{user}:***@")),
            None => redacted.push_str(&format!("{auth}@")),
        }
    }
    redacted.push_str(location);
    if let Some(query) = query {
        redacted.push('?');
        redacted.push_str(&redact_pairs(query));
    }

    let host = host_port
        .rsplit_once(':')
        .map_or(host_port, |(host, _)| host);

    RedactedConnection {
        engine: Some(engine.to_string()),
        host: Some(host).filter(|host| !host.is_empty()).map(str::to_string),
        database: database
            .filter(|database| !database.is_empty())
            .map(str::to_string),
        redacted,
    }
}

fn redact_query(conn: &str) -> String {
    match conn.split_once('?') {
        Some((base, query)) => format!("{base}?{}", redact_pairs(query)),
        None => conn.to_string(),
    }
}

fn redact_pairs(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if SENSITIVE_PARAMS.contains(&key.to_ascii_lowercase().as_str()) => {
                format!("{key}=***")
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}
