//! # 辅助解析函数
//!
//! 手写的字符串解析辅助函数，无正则依赖。
//! 所有扫描都跟踪括号深度和引号，引号内的字符不参与匹配。

/// 检查字符串是否以指定前缀开头（大小写不敏感）
pub fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.chars()
            .zip(prefix.chars())
            .all(|(a, b)| a.eq_ignore_ascii_case(&b))
}

/// 去掉大小写不敏感的关键字前缀，要求关键字后紧跟空白或 `terminator`
///
/// 返回去掉关键字后的剩余部分（保留开头的空白）。
pub fn strip_keyword_ignore_case<'a>(s: &'a str, keyword: &str, terminator: char) -> Option<&'a str> {
    if !starts_with_ignore_case(s, keyword) {
        return None;
    }
    let rest = s.get(keyword.len()..)?;
    match rest.chars().next() {
        Some(c) if c.is_whitespace() || c == terminator => Some(rest),
        _ => None,
    }
}

/// 引号与括号跟踪器
struct Scanner {
    depth: i32,
    quote: Option<char>,
}

impl Scanner {
    fn new() -> Self {
        Self {
            depth: 0,
            quote: None,
        }
    }

    /// 处理一个字符，返回该字符是否位于顶层（深度 0 且不在引号内）
    fn step(&mut self, c: char) -> bool {
        if let Some(q) = self.quote {
            if c == q {
                self.quote = None;
            }
            return false;
        }
        match c {
            '\'' | '"' => {
                self.quote = Some(c);
                false
            }
            '(' => {
                self.depth += 1;
                false
            }
            ')' => {
                self.depth -= 1;
                false
            }
            _ => self.depth == 0,
        }
    }
}

/// 拆分调用：`s` 以 `(` 开头，返回括号内的内容和 `)` 之后的剩余部分
///
/// 括号不配对时返回 `None`。
pub fn split_call(s: &str) -> Option<(&str, &str)> {
    if !s.starts_with('(') {
        return None;
    }
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&s[1..i], &s[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

/// 按顶层逗号拆分参数列表
///
/// 空参数列表返回空 Vec；每个参数去除首尾空白。
pub fn split_args(inner: &str) -> Vec<&str> {
    if inner.trim().is_empty() {
        return Vec::new();
    }
    let mut args = Vec::new();
    let mut scanner = Scanner::new();
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        if scanner.step(c) && c == ',' {
            args.push(inner[start..i].trim());
            start = i + 1;
        }
    }
    args.push(inner[start..].trim());
    args
}

/// 查找顶层（深度 0、引号外）第一次出现的 `pattern`，返回字节下标
pub fn find_top_level(s: &str, pattern: &str) -> Option<usize> {
    let mut scanner = Scanner::new();
    for (i, c) in s.char_indices() {
        if scanner.step(c) && s[i..].starts_with(pattern) {
            return Some(i);
        }
    }
    None
}

/// 顶层（深度 0、引号外）出现的指定字符及其字节下标
pub fn top_level_chars(s: &str, targets: &[char]) -> Vec<(usize, char)> {
    let mut scanner = Scanner::new();
    s.char_indices()
        .filter(|(_, c)| scanner.step(*c) && targets.contains(c))
        .collect()
}

/// 是否是合法的名字（字母、数字、下划线，允许 Unicode 字母）
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// 解析 `as name` 后缀
pub fn parse_as_name(rest: &str) -> Option<&str> {
    let rest = rest.trim();
    let name = rest.strip_prefix("as")?;
    if !name.starts_with(char::is_whitespace) {
        return None;
    }
    let name = name.trim();
    is_identifier(name).then_some(name)
}

/// 是否是布尔字面量单词
pub fn is_bool_word(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "false" | "tr" | "yes" | "y" | "no" | "n" | "1" | "0"
    )
}

/// 从 `name.suffix...` 中拆出控件名和以 `.` 开头的剩余部分
pub fn split_widget_name(line: &str) -> Option<(&str, &str)> {
    let dot = line.find('.')?;
    let (name, rest) = line.split_at(dot);
    is_identifier(name).then_some((name, rest))
}
