// ── eAPI transport ──
//
// Bridges the transport seam to `eosman_api::EapiClient`. eAPI calls are
// stateless, so each dispatch replays the CLI context (`enable`, the
// active `configure` session, the current config submode) in front of
// the command. The context is tracked per device from the commands that
// went through successfully.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures_util::future::BoxFuture;
use tracing::{debug, trace};
use url::Url;

use eosman_api::{EapiClient, TlsMode, TransportConfig};

use super::{Transport, TransportError, TransportReply};
use crate::config::{EapiCredentials, TlsVerification};
use crate::model::{Device, DeviceId};

/// Commands that open a nested configuration mode.
const SUBMODE_PREFIXES: &[&str] = &["interface ", "vlan ", "router ", "ip access-list "];

/// Transport that talks to real switches over HTTPS eAPI.
pub struct EapiTransport {
    credentials: EapiCredentials,
    http: TransportConfig,
    clients: DashMap<DeviceId, Arc<EapiClient>>,
    contexts: DashMap<DeviceId, CliContext>,
}

impl EapiTransport {
    pub fn new(credentials: EapiCredentials, tls: TlsVerification, timeout: Duration) -> Self {
        let tls = match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        Self {
            credentials,
            http: TransportConfig { tls, timeout },
            clients: DashMap::new(),
            contexts: DashMap::new(),
        }
    }

    /// Forget any configuration session tracked for `device_id`.
    pub fn reset_context(&self, device_id: &DeviceId) {
        self.contexts.remove(device_id);
    }

    fn client_for(&self, device: &Device) -> Result<Arc<EapiClient>, TransportError> {
        if let Some(client) = self.clients.get(&device.id) {
            return Ok(Arc::clone(client.value()));
        }

        let base = base_url(&device.address)?;
        let client = EapiClient::new(
            &base,
            self.credentials.username.clone(),
            self.credentials.password.clone(),
            &self.http,
        )
        .map_err(|e| TransportError::Failed(e.to_string()))?;

        debug!(device = %device.id, endpoint = %client.endpoint(), "created eAPI client");
        let client = Arc::new(client);
        self.clients.insert(device.id.clone(), Arc::clone(&client));
        Ok(client)
    }
}

impl Transport for EapiTransport {
    fn send<'a>(
        &'a self,
        device: &'a Device,
        command: &'a str,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<TransportReply, TransportError>> {
        Box::pin(async move {
            let client = self.client_for(device)?;
            let context = self
                .contexts
                .get(&device.id)
                .map(|c| c.value().clone())
                .unwrap_or_default();

            let mut cmds = vec!["enable"];
            cmds.extend(context.prefix());
            cmds.push(command);
            trace!(device = %device.id, ?cmds, "eAPI batch");

            match client.run_cmds(&cmds).await {
                Ok(outputs) => {
                    let mut next = context.clone();
                    next.advance(command);
                    self.contexts.insert(device.id.clone(), next);
                    Ok(TransportReply::success(
                        outputs.last().cloned().unwrap_or_default(),
                    ))
                }
                Err(eosman_api::Error::Command {
                    message,
                    errors,
                    output,
                    ..
                }) => Ok(TransportReply::failure(rejection_text(
                    &message,
                    &errors,
                    output.as_deref(),
                ))),
                Err(e) if e.is_timeout() => Err(TransportError::Timeout(timeout)),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn reset(&self, device_id: &DeviceId) {
        self.reset_context(device_id);
    }
}

/// Build the eAPI base URL from a registry address.
///
/// Bare hosts get `https://`; explicit URLs are used as given.
fn base_url(address: &str) -> Result<Url, TransportError> {
    let raw = if address.contains("://") {
        address.to_owned()
    } else {
        format!("https://{address}/")
    };
    Url::parse(&raw).map_err(|e| TransportError::Unreachable(format!("{address}: {e}")))
}

fn rejection_text(message: &str, errors: &[String], output: Option<&str>) -> String {
    let mut text = String::new();
    if let Some(out) = output.filter(|o| !o.trim().is_empty()) {
        text.push_str(out.trim_end());
        text.push('\n');
    }
    if errors.is_empty() {
        text.push_str("% ");
        text.push_str(message);
    } else {
        for (i, err) in errors.iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str("% ");
            text.push_str(err);
        }
    }
    text
}

// ── CLI context tracking ────────────────────────────────────────────

/// The mode a device's CLI session would be in after the commands sent so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CliContext {
    configure: Option<String>,
    submode: Option<String>,
}

impl CliContext {
    fn prefix(&self) -> impl Iterator<Item = &str> {
        self.configure
            .as_deref()
            .into_iter()
            .chain(self.submode.as_deref())
    }

    fn advance(&mut self, command: &str) {
        let cmd = command.trim();
        let lower = cmd.to_ascii_lowercase();

        if lower == "configure" || lower == "configure terminal" || lower.starts_with("configure session") {
            self.configure = Some(cmd.to_owned());
            self.submode = None;
            return;
        }
        if self.configure.is_none() {
            return;
        }
        if lower == "end" {
            *self = Self::default();
        } else if lower == "exit" {
            if self.submode.take().is_none() {
                self.configure = None;
            }
        } else if SUBMODE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            self.submode = Some(cmd.to_owned());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn walk(cmds: &[&str]) -> CliContext {
        let mut ctx = CliContext::default();
        for cmd in cmds {
            ctx.advance(cmd);
        }
        ctx
    }

    #[test]
    fn show_commands_leave_context_alone() {
        assert_eq!(walk(&["show version", "interface Ethernet1"]), CliContext::default());
    }

    #[test]
    fn configure_then_interface_nests() {
        let ctx = walk(&["configure", "interface Ethernet1", "description uplink"]);
        assert_eq!(
            ctx.prefix().collect::<Vec<_>>(),
            vec!["configure", "interface Ethernet1"]
        );
    }

    #[test]
    fn new_submode_replaces_previous() {
        let ctx = walk(&["configure", "interface Vxlan1", "vlan 20"]);
        assert_eq!(ctx.submode.as_deref(), Some("vlan 20"));
    }

    #[test]
    fn exit_pops_one_level_and_end_clears() {
        let mut ctx = walk(&["configure", "router bgp 65001", "exit"]);
        assert_eq!(ctx.prefix().collect::<Vec<_>>(), vec!["configure"]);
        ctx.advance("end");
        assert_eq!(ctx, CliContext::default());
    }

    #[test]
    fn reset_forgets_the_tracked_session() {
        let transport = EapiTransport::new(
            EapiCredentials {
                username: "admin".into(),
                password: secrecy::SecretString::from("secret".to_string()),
            },
            TlsVerification::DangerAcceptInvalid,
            Duration::from_secs(5),
        );
        let sw1 = DeviceId::from("sw1");
        transport
            .contexts
            .insert(sw1.clone(), walk(&["configure", "interface Ethernet1"]));

        Transport::reset(&transport, &sw1);
        assert!(transport.contexts.get(&sw1).is_none());
    }

    #[test]
    fn base_url_adds_https_for_bare_hosts() {
        assert_eq!(base_url("10.0.0.1").unwrap().as_str(), "https://10.0.0.1/");
        assert_eq!(
            base_url("http://127.0.0.1:8080/").unwrap().as_str(),
            "http://127.0.0.1:8080/"
        );
    }

    #[test]
    fn rejection_text_prefers_per_command_errors() {
        let text = rejection_text(
            "CLI command 2 of 2 'show bogus' failed: invalid command",
            &["Invalid input (at token 1: 'bogus')".into()],
            None,
        );
        assert_eq!(text, "% Invalid input (at token 1: 'bogus')");
    }
}
