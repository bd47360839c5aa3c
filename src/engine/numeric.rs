// ==========================================
// 变压器试验记录 - 数值格式 (逗号小数)
// ==========================================
// 职责: 逗号小数文本 <-> f64 的解析与格式化
// 红线: 原始输入保持用户键入的逗号文本，格式化只作用于计算结果
// ==========================================

/// 默认格式化小数位数
pub const DEFAULT_DECIMALS: usize = 3;

/// 缺值/非有限值的占位符
pub const PLACEHOLDER: &str = "-";

/// 解析逗号小数文本（算术语境）
///
/// # 规则
/// - 首个逗号替换为句点后按浮点解析
/// - 空白输入 → 0.0（调用方需自行区分"无值"，见 `parse_value`）
/// - 无法解析 → NaN
pub fn parse(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.replacen(',', ".", 1).parse::<f64>().unwrap_or(f64::NAN)
}

/// 解析逗号小数文本，区分"无值"
///
/// # 返回
/// - Some(v): 非空且可解析为有限数
/// - None: 空白 / 无法解析 / 非有限
pub fn parse_value(text: &str) -> Option<f64> {
    if text.trim().is_empty() {
        return None;
    }
    let value = parse(text);
    value.is_finite().then_some(value)
}

/// 是否为空白（未测量）
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// 定点格式化，句点替换为逗号
///
/// # 规则
/// - None / NaN / ±Inf → "-"
/// - 其他 → 保留 `decimals` 位小数
pub fn format(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v).replacen('.', ",", 1),
        _ => PLACEHOLDER.to_string(),
    }
}

/// 以默认小数位数格式化
pub fn format_default(value: Option<f64>) -> String {
    format(value, DEFAULT_DECIMALS)
}

/// 写入前规范化为逗号小数
///
/// 句点小数（"1.5"）改写为逗号小数（"1,5"），其余字符原样保留
pub fn to_decimal_comma(text: &str) -> String {
    text.replacen('.', ",", 1)
}
