// ==========================================
// 变压器试验记录 - 派生计算引擎
// ==========================================
// 职责: 变比偏差 / 温度修正电阻 / DAR / PI
// 红线: 全部为纯函数且全域定义，缺值、非法值、除零一律返回 None
// 红线: 不向调用方暴露 NaN / Inf
// ==========================================

use crate::engine::numeric::parse_value;

/// 铜绕组温度修正常数 (°C)，固定不可配置
pub const COPPER_TEMP_CONSTANT: f64 = 235.0;

/// 结果仅保留有限值
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// 变比偏差 (%)
///
/// # 规则
/// - measured / rated 任一缺失或非法 → None
/// - rated = 0 → None
/// - 否则 (measured - rated) / rated × 100
pub fn deviation_percent(measured: &str, rated: &str) -> Option<f64> {
    let measured = parse_value(measured)?;
    let rated = parse_value(rated)?;
    if rated == 0.0 {
        return None;
    }
    finite((measured - rated) / rated * 100.0)
}

/// 温度修正后的绕组电阻
///
/// # 规则
/// - 三个输入任一缺失或非法 → None
/// - 否则 measured × (235 + refTemp) / (235 + measuredTemp)
/// - measuredTemp = -235 时分母为零 → None
pub fn resistance_corrected(measured: &str, measured_temp_c: &str, ref_temp_c: &str) -> Option<f64> {
    let measured = parse_value(measured)?;
    let measured_temp = parse_value(measured_temp_c)?;
    let ref_temp = parse_value(ref_temp_c)?;
    let denominator = COPPER_TEMP_CONSTANT + measured_temp;
    if denominator == 0.0 {
        return None;
    }
    finite(measured * (COPPER_TEMP_CONSTANT + ref_temp) / denominator)
}

/// 介质吸收比 DAR = R(1min) / R(30s)
pub fn dielectric_absorption_ratio(val_1m: &str, val_30s: &str) -> Option<f64> {
    ratio(val_1m, val_30s)
}

/// 极化指数 PI = R(10min) / R(1min)
pub fn polarization_index(val_10m: &str, val_1m: &str) -> Option<f64> {
    ratio(val_10m, val_1m)
}

fn ratio(numerator: &str, denominator: &str) -> Option<f64> {
    let numerator = parse_value(numerator)?;
    let denominator = parse_value(denominator)?;
    if denominator == 0.0 {
        return None;
    }
    finite(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("expected a value");
        assert!(
            (actual - expected).abs() < 1e-9,
            "actual={} expected={}",
            actual,
            expected
        );
    }

    #[test]
    fn test_deviation_percent() {
        approx(deviation_percent("100,5", "100"), 0.5);
        approx(deviation_percent("101", "100"), 1.0);
        approx(deviation_percent("99", "100"), -1.0);
    }

    #[test]
    fn test_deviation_percent_undefined() {
        assert_eq!(deviation_percent("100", "0"), None);
        assert_eq!(deviation_percent("100", "0,0"), None);
        assert_eq!(deviation_percent("abc", "100"), None);
        assert_eq!(deviation_percent("100", "x"), None);
        assert_eq!(deviation_percent("", "100"), None);
        assert_eq!(deviation_percent("100", ""), None);
    }

    #[test]
    fn test_resistance_corrected() {
        approx(
            resistance_corrected("10", "20", "75"),
            10.0 * (235.0 + 75.0) / (235.0 + 20.0),
        );
        approx(resistance_corrected("0,5", "75", "75"), 0.5);
    }

    #[test]
    fn test_resistance_corrected_undefined() {
        assert_eq!(resistance_corrected("", "20", "75"), None);
        assert_eq!(resistance_corrected("10", "", "75"), None);
        assert_eq!(resistance_corrected("10", "20", "?"), None);
        assert_eq!(resistance_corrected("10", "-235", "75"), None);
    }

    #[test]
    fn test_dar() {
        approx(dielectric_absorption_ratio("2", "1"), 2.0);
        approx(dielectric_absorption_ratio("1,5", "1"), 1.5);
        assert_eq!(dielectric_absorption_ratio("2", "0"), None);
        assert_eq!(dielectric_absorption_ratio("", "1"), None);
    }

    #[test]
    fn test_pi() {
        approx(polarization_index("5", "5"), 1.0);
        approx(polarization_index("5,01", "5"), 1.002);
        assert_eq!(polarization_index("5", "0"), None);
        assert_eq!(polarization_index("5", "n/a"), None);
    }
}
