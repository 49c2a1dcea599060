//! `.properties` 文本解析

use thiserror::Error;

/// 属性文件解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("第 {line} 行: {message}")]
pub struct PropertiesParseError {
    /// 出错的逻辑行起始行号（从 1 开始）
    pub line: usize,
    /// 错误描述
    pub message: String,
}

impl PropertiesParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// 解析 `.properties` 文本，按出现顺序返回键值对
///
/// 支持 `#`/`!` 注释、`=`/`:`/空白分隔符、反斜杠续行以及 `\t \n \r \f \uXXXX` 转义。
/// 同一文件内重复的键保留最后一次出现的值。
pub fn parse_properties(content: &str) -> Result<Vec<(String, String)>, PropertiesParseError> {
    let mut entries = Vec::new();
    let mut logical = String::new();
    let mut start_line = 0;
    let mut continuing = false;

    for (index, raw_line) in content.split('\n').enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let trimmed = line.trim_start_matches(is_whitespace);

        if !continuing {
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }
            start_line = index + 1;
        }

        if ends_with_continuation(trimmed) {
            logical.push_str(&trimmed[..trimmed.len() - 1]);
            continuing = true;
            continue;
        }

        logical.push_str(trimmed);
        continuing = false;
        entries.push(parse_entry(&logical, start_line)?);
        logical.clear();
    }

    if continuing && !logical.is_empty() {
        entries.push(parse_entry(&logical, start_line)?);
    }

    Ok(entries)
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// 行尾奇数个反斜杠表示续行
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn parse_entry(line: &str, line_no: usize) -> Result<(String, String), PropertiesParseError> {
    let chars: Vec<char> = line.chars().collect();

    let mut key_end = chars.len();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == '=' || c == ':' || is_whitespace(c) {
            key_end = i;
            break;
        }
        i += 1;
    }

    let mut value_start = key_end;
    while value_start < chars.len() && is_whitespace(chars[value_start]) {
        value_start += 1;
    }
    if value_start < chars.len() && (chars[value_start] == '=' || chars[value_start] == ':') {
        value_start += 1;
        while value_start < chars.len() && is_whitespace(chars[value_start]) {
            value_start += 1;
        }
    }

    let key = unescape(&chars[..key_end], line_no)?;
    let value = unescape(&chars[value_start..], line_no)?;
    Ok((key, value))
}

fn unescape(chars: &[char], line_no: usize) -> Result<String, PropertiesParseError> {
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(&escaped) = chars.get(i) else {
            break;
        };
        i += 1;

        match escaped {
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'f' => out.push('\u{c}'),
            'u' => {
                let unit = read_code_unit(chars, i, line_no)?;
                i += 4;
                if (0xD800..=0xDBFF).contains(&unit) {
                    let low = if chars.get(i) == Some(&'\\') && chars.get(i + 1) == Some(&'u') {
                        read_code_unit(chars, i + 2, line_no)?
                    } else {
                        return Err(PropertiesParseError::new(line_no, "高位代理后缺少低位代理"));
                    };
                    if !(0xDC00..=0xDFFF).contains(&low) {
                        return Err(PropertiesParseError::new(line_no, "无效的代理对"));
                    }
                    i += 6;
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    out.push(to_char(combined, line_no)?);
                } else {
                    out.push(to_char(unit, line_no)?);
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

fn read_code_unit(chars: &[char], start: usize, line_no: usize) -> Result<u32, PropertiesParseError> {
    let digits: String = chars.iter().skip(start).take(4).collect();
    if digits.chars().count() != 4 {
        return Err(PropertiesParseError::new(line_no, "不完整的 \\uXXXX 转义"));
    }
    u32::from_str_radix(&digits, 16)
        .map_err(|_| PropertiesParseError::new(line_no, format!("无效的 \\u 转义: \\u{}", digits)))
}

fn to_char(code: u32, line_no: usize) -> Result<char, PropertiesParseError> {
    char::from_u32(code)
        .ok_or_else(|| PropertiesParseError::new(line_no, format!("无效的字符编码: {:#x}", code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Vec<(String, String)> {
        parse_properties(content).unwrap()
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    /// 测试分隔符和注释
    #[test]
    fn test_separators_and_comments() {
        let entries = parse("# comment\n! also comment\n\na=1\nb : 2\nc 3\n   d=  4  \n");
        assert_eq!(
            entries,
            vec![pair("a", "1"), pair("b", "2"), pair("c", "3"), pair("d", "4  ")]
        );
    }

    /// 测试只有键没有值的行
    #[test]
    fn test_key_without_value() {
        assert_eq!(parse("flag\nempty=\n"), vec![pair("flag", ""), pair("empty", "")]);
    }

    /// 测试续行
    #[test]
    fn test_line_continuation() {
        let entries = parse("list=a,\\\n    b,\\\n    c\nnext=1\n");
        assert_eq!(entries, vec![pair("list", "a,b,c"), pair("next", "1")]);
    }

    /// 测试转义的反斜杠不是续行
    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let entries = parse("path=C:\\\\temp\\\\\nother=x\n");
        assert_eq!(entries, vec![pair("path", "C:\\temp\\"), pair("other", "x")]);
    }

    /// 测试键和值中的转义
    #[test]
    fn test_escapes_in_keys_and_values() {
        let entries = parse("a\\=b=c\\td\nname=caf\\u00e9\nkey\\ with\\ space=v\n");
        assert_eq!(
            entries,
            vec![pair("a=b", "c\td"), pair("name", "café"), pair("key with space", "v")]
        );
    }

    /// 测试代理对转义
    #[test]
    fn test_surrogate_pair_escape() {
        assert_eq!(parse("emoji=\\ud83d\\ude00\n"), vec![pair("emoji", "😀")]);
    }

    /// 测试 CRLF 换行
    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(parse("a=1\r\nb=2\r\n"), vec![pair("a", "1"), pair("b", "2")]);
    }

    /// 测试错误的 `\u` 转义报告行号
    #[test]
    fn test_malformed_unicode_escape_reports_line() {
        let error = parse_properties("ok=1\nbad=\\u12zz\n").unwrap_err();
        assert_eq!(error.line, 2);
    }

    /// 测试截断的 `\u` 转义
    #[test]
    fn test_truncated_unicode_escape() {
        assert!(parse_properties("bad=\\u12").is_err());
    }
}
