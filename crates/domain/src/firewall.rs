use crate::game::{PortRange, Protocol};
use ipnetwork::IpNetwork;
use std::fmt;

/// What a drop rule matches on, besides the source client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget {
    /// Destination port range for one protocol.
    Port { proto: Protocol, range: PortRange },
    /// Destination network (game server addresses).
    Dest(IpNetwork),
}

/// One logical drop rule for the dedicated forward chain.
///
/// `game` is the owning game used in the rule comment; for shared port
/// ranges it is the first owner in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    pub client: String,
    pub game: String,
    pub target: RuleTarget,
}

impl FirewallRule {
    /// Identifying comment: `ionman:<game>:<client>` for port rules,
    /// `ionman:<game>:<client>:ip` for destination rules.
    pub fn comment(&self) -> String {
        match self.target {
            RuleTarget::Port { .. } => format!("ionman:{}:{}", self.game, self.client),
            RuleTarget::Dest(_) => format!("ionman:{}:{}:ip", self.game, self.client),
        }
    }
}

impl fmt::Display for FirewallRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            RuleTarget::Port { proto, range } => {
                write!(f, "drop {} {} dport {}", self.client, proto, range)
            }
            RuleTarget::Dest(net) => write!(f, "drop {} dest {}", self.client, net),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_rule_comment_shape() {
        let rule = FirewallRule {
            client: "10.0.0.7".into(),
            game: "minecraft".into(),
            target: RuleTarget::Port {
                proto: Protocol::Tcp,
                range: PortRange::single(25565),
            },
        };
        assert_eq!(rule.comment(), "ionman:minecraft:10.0.0.7");
    }

    #[test]
    fn dest_rule_comment_has_ip_suffix() {
        let rule = FirewallRule {
            client: "10.0.0.7".into(),
            game: "fortnite".into(),
            target: RuleTarget::Dest("3.24.0.0/14".parse().unwrap()),
        };
        assert_eq!(rule.comment(), "ionman:fortnite:10.0.0.7:ip");
    }
}
