use sysinfo::System;

use super::*;

const KEYS: &str = "os, os_version, kernel_version, hostname, cpu_arch, cpu_count, \
                    memory_total, memory_free, memory_used, uptime";

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.insert("sys", 1, Some(1), false, Box::new(eval_sys));
}

/// `@sys("hostname")` and friends. The snapshot is taken lazily, at most
/// once per parse, so repeated lookups agree with each other.
fn eval_sys(args: &[Value], ctx: &EvalContext) -> Result<Value, OperatorError> {
    let key = expect_string("sys", args, 0)?;

    ctx.sys_value(key)
        .map(Value::String)
        .ok_or_else(|| OperatorError::ArgumentMismatch {
            operator: "sys".to_string(),
            expected: format!("one of: {}", KEYS),
            got: format!("'{}'", key),
        })
}

pub(crate) fn snapshot() -> HashMap<String, String> {
    let mut sys = System::new_all();
    sys.refresh_all();

    let mut map = HashMap::new();
    if let Some(os) = System::name() {
        map.insert("os".to_string(), os);
    }
    if let Some(version) = System::os_version() {
        map.insert("os_version".to_string(), version);
    }
    if let Some(version) = System::kernel_version() {
        map.insert("kernel_version".to_string(), version);
    }
    if let Some(hostname) = System::host_name() {
        map.insert("hostname".to_string(), hostname);
    }
    map.insert("cpu_arch".to_string(), System::cpu_arch());
    map.insert("cpu_count".to_string(), sys.cpus().len().to_string());
    map.insert("memory_total".to_string(), format_bytes(sys.total_memory()));
    map.insert("memory_free".to_string(), format_bytes(sys.free_memory()));
    map.insert("memory_used".to_string(), format_bytes(sys.used_memory()));
    map.insert("uptime".to_string(), format_uptime(System::uptime()));
    map
}

fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    const TB: f64 = GB * 1024.0;

    let b = bytes as f64;
    if b >= TB {
        format!("{:.2} TB", b / TB)
    } else if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

fn format_uptime(seconds: u64) -> String {
    if seconds < 60 {
        format!("{} sec{}", seconds, if seconds != 1 { "s" } else { "" })
    } else if seconds < 3600 {
        let minutes = seconds / 60;
        format!("{} min{}", minutes, if minutes != 1 { "s" } else { "" })
    } else {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        format!(
            "{} hr{}, {} min{}",
            hours,
            if hours != 1 { "s" } else { "" },
            minutes,
            if minutes != 1 { "s" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sys_known_keys_resolve() {
        let tc = TestContext::new();
        let registry = OperatorRegistry::with_builtins();

        for key in ["cpu_arch", "cpu_count", "memory_total", "uptime"] {
            let result = registry.dispatch("sys", &[Value::String(key.into())], &tc.ctx());
            match result {
                Ok(Value::String(s)) => assert!(!s.is_empty(), "empty value for sys.{}", key),
                other => panic!("Expected string for sys.{}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_sys_unknown_key() {
        let tc = TestContext::new();
        let registry = OperatorRegistry::with_builtins();

        let result = registry.dispatch("sys", &[Value::String("gpu_count".into())], &tc.ctx());
        assert!(matches!(result, Err(OperatorError::ArgumentMismatch { .. })));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(1), "1 sec");
        assert_eq!(format_uptime(120), "2 mins");
        assert_eq!(format_uptime(3660), "1 hr, 1 min");
    }
}
