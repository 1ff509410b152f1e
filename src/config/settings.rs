use serde::Deserialize;

/// Top-level configuration settings for the application.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
}

/// Where the WebSocket server binds and which path it upgrades.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub endpoint: String,
}

impl ServerSettings {
    /// `host:port`, as handed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from [`Settings::default`].
#[derive(Debug, Default, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "localhost".to_string(),
                port: 8080,
                endpoint: "/ws".to_string(),
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// Overlays whatever `partial` specifies onto these settings.
    pub fn merge(self, partial: PartialSettings) -> Self {
        let server = partial.server.unwrap_or_default();
        let log = partial.log.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(self.server.host),
                port: server.port.unwrap_or(self.server.port),
                endpoint: server.endpoint.unwrap_or(self.server.endpoint),
            },
            log: LogSettings {
                level: log.level.unwrap_or(self.log.level),
            },
        }
    }
}
