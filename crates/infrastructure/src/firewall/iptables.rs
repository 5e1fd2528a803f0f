use async_trait::async_trait;
use ionman_dns_application::ports::FirewallBackend;
use ionman_dns_domain::{DomainError, FirewallRule, RuleTarget};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// `iptables(8)` adapter for the dedicated drop chain.
///
/// Stderr noise for states that are already correct ("chain already
/// exists", "no chain/target/match by that name") is tolerated so repeated
/// sync cycles stay quiet.
pub struct IptablesBackend {
    chain: String,
}

impl IptablesBackend {
    pub fn new(chain: impl Into<String>) -> Self {
        Self {
            chain: chain.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, DomainError> {
        let output = Command::new("iptables")
            .args(args)
            .output()
            .await
            .map_err(|e| DomainError::FirewallError(format!("iptables {}: {e}", args.join(" "))))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !is_benign(&stderr) {
                debug!(args = args.join(" "), stderr = %stderr.trim(), "iptables command failed");
            }
        }
        Ok(output)
    }

    async fn succeeded(&self, args: &[&str]) -> bool {
        matches!(self.run(args).await, Ok(output) if output.status.success())
    }
}

/// Failure modes that mean "already in the desired state".
fn is_benign(stderr: &str) -> bool {
    stderr.contains("already")
        || stderr.contains("No chain")
        || stderr.contains("does a matching rule exist")
}

#[async_trait]
impl FirewallBackend for IptablesBackend {
    async fn ensure_chain(&self) -> Result<(), DomainError> {
        if !self.succeeded(&["-L", &self.chain, "-n"]).await {
            let created = self.succeeded(&["-N", &self.chain]).await;
            if !created && !self.succeeded(&["-L", &self.chain, "-n"]).await {
                // No chain and no way to create one is the only fatal case.
                return Err(DomainError::FirewallError(format!(
                    "cannot create chain {}",
                    self.chain
                )));
            }
            info!(chain = %self.chain, "Firewall chain created");
        }

        // Hook once, at the top of the forward path.
        if !self.succeeded(&["-C", "FORWARD", "-j", &self.chain]).await {
            self.run(&["-I", "FORWARD", "1", "-j", &self.chain]).await?;
            info!(chain = %self.chain, "Firewall chain hooked into FORWARD");
        }
        Ok(())
    }

    async fn flush_chain(&self) -> Result<(), DomainError> {
        self.run(&["-F", &self.chain]).await?;
        Ok(())
    }

    async fn append(&self, rule: &FirewallRule) -> Result<(), DomainError> {
        let comment = rule.comment();
        let mut args: Vec<&str> = vec!["-A", &self.chain, "-s", &rule.client];

        let dport;
        let dest;
        match &rule.target {
            RuleTarget::Port { proto, range } => {
                dport = if range.start == range.end {
                    range.start.to_string()
                } else {
                    format!("{}:{}", range.start, range.end)
                };
                args.extend_from_slice(&["-p", proto.as_str(), "--dport", &dport]);
            }
            RuleTarget::Dest(network) => {
                dest = network.to_string();
                args.extend_from_slice(&["-d", &dest]);
            }
        }
        args.extend_from_slice(&["-j", "DROP", "-m", "comment", "--comment", &comment]);

        let output = self.run(&args).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !is_benign(&stderr) {
                warn!(rule = %rule, stderr = %stderr.trim(), "Firewall rule insert failed");
            }
        }
        Ok(())
    }

    async fn list_rules(&self) -> Result<String, DomainError> {
        let output = self
            .run(&["-L", &self.chain, "-n", "-v", "--line-numbers"])
            .await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn teardown(&self) -> Result<(), DomainError> {
        self.run(&["-F", &self.chain]).await?;
        self.run(&["-D", "FORWARD", "-j", &self.chain]).await?;
        self.run(&["-X", &self.chain]).await?;
        info!(chain = %self.chain, "Firewall chain removed");
        Ok(())
    }
}
