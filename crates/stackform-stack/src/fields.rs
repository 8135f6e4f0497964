//! Single-field converters: command lines, health checks, logging,
//! network placement, application DNS information, S3 locations.

use std::collections::BTreeMap;
use std::time::Duration;

use stackform_manifest::{
    Alias, CommandOverride, DEFAULT_HEALTH_CHECK_GRACE_PERIOD, DEFAULT_HEALTH_CHECK_PATH,
    EntryPointOverride, ExecuteCommand, HealthCheckArgsOrString, Logging, NetworkConfig,
    PUBLIC_SUBNET_PLACEMENT, StringOrSlice,
};
use stackform_template::{
    DISABLE_PUBLIC_IP, ExecuteCommandOpts, HttpHealthCheckOpts, LogConfigOpts, NetworkOpts,
    PRIVATE_SUBNETS_PLACEMENT,
};

use crate::error::{ConvertError, ConvertResult};

fn convert_string_slice(
    field: &'static str,
    value: Option<&StringOrSlice>,
) -> ConvertResult<Option<Vec<String>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    value
        .to_string_slice()
        .map(Some)
        .map_err(|source| ConvertError::StringSlice { field, source })
}

pub fn convert_entry_point(entry_point: Option<&EntryPointOverride>) -> ConvertResult<Option<Vec<String>>> {
    convert_string_slice("entrypoint", entry_point)
}

pub fn convert_command(command: Option<&CommandOverride>) -> ConvertResult<Option<Vec<String>>> {
    convert_string_slice("command", command)
}

pub fn convert_alias(alias: Option<&Alias>) -> ConvertResult<Option<Vec<String>>> {
    convert_string_slice("http.alias", alias)
}

/// Load balancer health check with defaults applied. A path given in the
/// argument form wins over the bare-string form.
pub fn convert_http_health_check(hc: Option<&HealthCheckArgsOrString>) -> HttpHealthCheckOpts {
    let mut opts = HttpHealthCheckOpts {
        health_check_path: hc
            .and_then(HealthCheckArgsOrString::path)
            .unwrap_or(DEFAULT_HEALTH_CHECK_PATH)
            .to_string(),
        grace_period: DEFAULT_HEALTH_CHECK_GRACE_PERIOD,
        ..Default::default()
    };
    let Some(args) = hc.and_then(HealthCheckArgsOrString::args) else {
        return opts;
    };
    opts.success_codes = args.success_codes.clone();
    opts.healthy_threshold = args.healthy_threshold;
    opts.unhealthy_threshold = args.unhealthy_threshold;
    opts.interval = args.interval.map(whole_seconds);
    opts.timeout = args.timeout.map(whole_seconds);
    if let Some(grace) = args.grace_period {
        opts.grace_period = whole_seconds(grace);
    }
    opts
}

/// Whole seconds, saturating at `i64::MAX`.
fn whole_seconds(d: Duration) -> i64 {
    i64::try_from(d.as_secs()).unwrap_or(i64::MAX)
}

/// `None` unless exec is turned on, either as `exec: true` or
/// `exec: { enable: true }`.
pub fn convert_execute_command(exec: Option<&ExecuteCommand>) -> Option<ExecuteCommandOpts> {
    match exec? {
        ExecuteCommand::Enable(true) => Some(ExecuteCommandOpts {}),
        ExecuteCommand::Enable(false) => None,
        ExecuteCommand::Config(cfg) if cfg.is_empty() => None,
        ExecuteCommand::Config(cfg) => cfg.enable.unwrap_or(false).then_some(ExecuteCommandOpts {}),
    }
}

pub fn convert_logging(logging: Option<&Logging>) -> Option<LogConfigOpts> {
    let lc = logging?;
    Some(LogConfigOpts {
        image: lc.log_image(),
        destination: lc.destination.clone(),
        enable_metadata: lc.enable_metadata_value(),
        secret_options: lc.secret_options.clone(),
        config_file: lc.config_file.clone(),
    })
}

/// Public placement with a public IP unless the manifest asks for any
/// other placement.
pub fn convert_network_config(network: Option<&NetworkConfig>) -> NetworkOpts {
    let mut opts = NetworkOpts::default();
    let Some(vpc) = network.and_then(|n| n.vpc.as_ref()) else {
        return opts;
    };
    opts.security_groups = vpc.security_groups.clone().unwrap_or_default();
    if vpc.placement.as_deref() != Some(PUBLIC_SUBNET_PLACEMENT) {
        opts.assign_public_ip = DISABLE_PUBLIC_IP.to_string();
        opts.subnets_type = PRIVATE_SUBNETS_PLACEMENT.to_string();
    }
    opts
}

/// Application-level information used for DNS.
#[derive(Debug, Clone, Default)]
pub struct AppInformation {
    pub name: String,
    pub dns_name: String,
    /// e.g. `arn:aws:iam::123456789012:root`.
    pub account_principal_arn: String,
}

impl AppInformation {
    /// Role used to delegate the application's hosted zone, or an empty
    /// string when it cannot be derived.
    pub fn dns_delegation_role(&self) -> String {
        if self.name.is_empty() || self.account_principal_arn.is_empty() {
            return String::new();
        }
        let parts: Vec<&str> = self.account_principal_arn.splitn(6, ':').collect();
        match parts.as_slice() {
            ["arn", partition, _service, _region, account_id, _resource]
                if !partition.is_empty() && !account_id.is_empty() =>
            {
                format!(
                    "arn:{partition}:iam::{account_id}:role/{}-DNSDelegationRole",
                    self.name
                )
            }
            _ => String::new(),
        }
    }
}

/// Returns `(dns_delegation_role, dns_name)`, each `None` when empty.
pub fn convert_app_information(app: &AppInformation) -> (Option<String>, Option<String>) {
    let role = app.dns_delegation_role();
    let delegation_role = (!role.is_empty()).then_some(role);
    let dns_name = (!app.dns_name.is_empty()).then(|| app.dns_name.clone());
    (delegation_role, dns_name)
}

/// Parse an `s3://bucket/key` URL into `(bucket, key)`.
pub fn parse_s3_url(url: &str) -> ConvertResult<(String, String)> {
    let invalid = |reason: &str| ConvertError::S3Url {
        url: url.to_string(),
        reason: reason.to_string(),
    };
    let rest = url
        .strip_prefix("s3://")
        .ok_or_else(|| invalid("must start with s3://"))?;
    let (bucket, key) = rest
        .split_once('/')
        .ok_or_else(|| invalid("must contain a bucket and a key"))?;
    if bucket.is_empty() || key.is_empty() {
        return Err(invalid("must contain a bucket and a key"));
    }
    Ok((bucket.to_string(), key.to_string()))
}

/// Parse a map of name → S3 URL with `parser`. Returns the bucket and the
/// name → key map; `(None, None)` for an empty input. When URLs name
/// different buckets the last one in name order is returned.
pub fn parse_s3_urls<F>(
    name_to_url: &BTreeMap<String, String>,
    parser: F,
) -> ConvertResult<(Option<String>, Option<BTreeMap<String, String>>)>
where
    F: Fn(&str) -> ConvertResult<(String, String)>,
{
    if name_to_url.is_empty() {
        return Ok((None, None));
    }
    let mut bucket = None;
    let mut keys = BTreeMap::new();
    for (name, url) in name_to_url {
        let (b, key) = parser(url)?;
        keys.insert(name.clone(), key);
        bucket = Some(b);
    }
    Ok((bucket, Some(keys)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use stackform_manifest::{ExecuteCommandConfig, HttpHealthCheckArgs, VpcConfig};
    use stackform_template::{ENABLE_PUBLIC_IP, PUBLIC_SUBNETS_PLACEMENT};

    #[test]
    fn entry_point_and_command() {
        let ep = StringOrSlice::String("/bin/sh -c 'echo hi'".to_string());
        assert_eq!(
            convert_entry_point(Some(&ep)).unwrap(),
            Some(vec!["/bin/sh".to_string(), "-c".to_string(), "echo hi".to_string()])
        );
        assert_eq!(convert_command(None).unwrap(), None);

        let broken = StringOrSlice::String("echo 'unterminated".to_string());
        assert!(matches!(
            convert_command(Some(&broken)),
            Err(ConvertError::StringSlice { field: "command", .. })
        ));
    }

    #[test]
    fn alias_list_passes_through() {
        let alias = StringOrSlice::Slice(vec!["a.example.com".to_string()]);
        assert_eq!(
            convert_alias(Some(&alias)).unwrap(),
            Some(vec!["a.example.com".to_string()])
        );
    }

    #[test]
    fn health_check_defaults() {
        let opts = convert_http_health_check(None);
        assert_eq!(opts.health_check_path, "/");
        assert_eq!(opts.grace_period, 60);
        assert_eq!(opts.interval, None);
    }

    #[test]
    fn health_check_string_path() {
        let hc = HealthCheckArgsOrString::Path("/healthz".to_string());
        assert_eq!(convert_http_health_check(Some(&hc)).health_check_path, "/healthz");
    }

    #[test]
    fn health_check_args() {
        let hc = HealthCheckArgsOrString::Args(HttpHealthCheckArgs {
            path: Some("/ping".to_string()),
            success_codes: Some("200,301".to_string()),
            healthy_threshold: Some(3),
            unhealthy_threshold: Some(2),
            interval: Some(Duration::from_secs(15)),
            timeout: Some(Duration::from_millis(5500)),
            grace_period: Some(Duration::from_secs(120)),
        });
        let opts = convert_http_health_check(Some(&hc));
        assert_eq!(opts.health_check_path, "/ping");
        assert_eq!(opts.success_codes.as_deref(), Some("200,301"));
        assert_eq!(opts.interval, Some(15));
        assert_eq!(opts.timeout, Some(5));
        assert_eq!(opts.grace_period, 120);
    }

    #[test]
    fn health_check_huge_durations_saturate() {
        let hc = HealthCheckArgsOrString::Args(HttpHealthCheckArgs {
            interval: Some(Duration::MAX),
            grace_period: Some(Duration::from_secs(u64::MAX)),
            ..Default::default()
        });
        let opts = convert_http_health_check(Some(&hc));
        assert_eq!(opts.interval, Some(i64::MAX));
        assert_eq!(opts.grace_period, i64::MAX);
    }

    #[test]
    fn exec_command() {
        assert!(convert_execute_command(None).is_none());
        assert!(convert_execute_command(Some(&ExecuteCommand::Enable(false))).is_none());
        assert!(convert_execute_command(Some(&ExecuteCommand::Enable(true))).is_some());
        assert!(
            convert_execute_command(Some(&ExecuteCommand::Config(ExecuteCommandConfig {
                enable: Some(true)
            })))
            .is_some()
        );
        assert!(
            convert_execute_command(Some(&ExecuteCommand::Config(ExecuteCommandConfig {
                enable: None
            })))
            .is_none()
        );
    }

    #[test]
    fn logging() {
        assert!(convert_logging(None).is_none());
        let lc = Logging {
            enable_metadata: Some(false),
            ..Default::default()
        };
        let opts = convert_logging(Some(&lc)).unwrap();
        assert_eq!(opts.enable_metadata, "false");
        assert!(opts.image.contains("aws-for-fluent-bit"));
    }

    #[test]
    fn network_defaults_to_public() {
        let opts = convert_network_config(None);
        assert_eq!(opts.assign_public_ip, ENABLE_PUBLIC_IP);
        assert_eq!(opts.subnets_type, PUBLIC_SUBNETS_PLACEMENT);
    }

    #[test]
    fn private_placement_disables_public_ip() {
        let network = NetworkConfig {
            vpc: Some(VpcConfig {
                placement: Some("private".to_string()),
                security_groups: Some(vec!["sg-1".to_string()]),
            }),
        };
        let opts = convert_network_config(Some(&network));
        assert_eq!(opts.assign_public_ip, DISABLE_PUBLIC_IP);
        assert_eq!(opts.subnets_type, PRIVATE_SUBNETS_PLACEMENT);
        assert_eq!(opts.security_groups, vec!["sg-1"]);
    }

    #[test]
    fn app_information() {
        let app = AppInformation {
            name: "shop".to_string(),
            dns_name: "example.com".to_string(),
            account_principal_arn: "arn:aws:iam::123456789012:root".to_string(),
        };
        let (role, dns) = convert_app_information(&app);
        assert_eq!(
            role.as_deref(),
            Some("arn:aws:iam::123456789012:role/shop-DNSDelegationRole")
        );
        assert_eq!(dns.as_deref(), Some("example.com"));

        let (role, dns) = convert_app_information(&AppInformation::default());
        assert!(role.is_none());
        assert!(dns.is_none());
    }

    #[test]
    fn s3_urls() {
        assert_eq!(
            parse_s3_url("s3://bucket/path/to/env.env").unwrap(),
            ("bucket".to_string(), "path/to/env.env".to_string())
        );
        assert!(parse_s3_url("https://bucket/key").is_err());
        assert!(parse_s3_url("s3://bucket").is_err());

        let urls: BTreeMap<String, String> = [
            ("a".to_string(), "s3://stack-bucket/a.txt".to_string()),
            ("b".to_string(), "s3://stack-bucket/dir/b.txt".to_string()),
        ]
        .into();
        let (bucket, keys) = parse_s3_urls(&urls, parse_s3_url).unwrap();
        assert_eq!(bucket.as_deref(), Some("stack-bucket"));
        assert_eq!(keys.unwrap()["b"], "dir/b.txt");

        assert_eq!(
            parse_s3_urls(&BTreeMap::new(), parse_s3_url).unwrap(),
            (None, None)
        );
    }
}
