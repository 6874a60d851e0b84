//! # 阶段 2：块解析
//!
//! 将块转换为 [`Statement`]。
//!
//! 每个逻辑行按 [`STATEMENT_RULES`] 的顺序逐条尝试，第一条匹配的规则生效；
//! 没有规则匹配时整份脚本解析失败。

use crate::error::ParseError;
use crate::script::ast::{Comparison, ConditionalKind, Expr, Statement};

use super::expr_parser::{parse_bool_argument, parse_expression};
use super::helpers::{
    find_top_level, is_identifier, parse_as_name, split_args, split_call, split_widget_name,
    strip_keyword_ignore_case,
};
use super::phase1::{Block, is_event_marker};

// -------------------------------------------------------------------------
// 语句写法
// -------------------------------------------------------------------------

const START: &[&str] = &["Qude.prompt", "qude.str()", "q>"];
const STOP: &[&str] = &["Qude.kill/", "qude.end", "q<"];
const CONSOLE_WRITE: &[&str] = &["Qonsol.write", "qonsol.write", "qons.wrt"];
const INPUT: &[&str] = &["taQe.putt", "tq.put", "q£"];
const ASSIGN: &[&str] = &["Qurr", "qrr", "q$"];
const ASSIGN_WORD: &str = "variable";
const MATH_ECHO: &[&str] = &["matq", "m;"];

const WINDOW_OPEN: &[&str] = &["Qwindow.qoll()", "qwd.qll()", "qwww()"];
const WINDOW_TITLE: &[&str] = &["Qwindow.uptext", "qwd.uptxt", "qw.utxt"];
const WINDOW_SIZE: &[&str] = &["Qwindow.geometry.size", "qwd.geom.sz", "qw.ge.sz"];
const WINDOW_RESIZABLE: &[&str] = &["Qwindow.resizable", "qwd.reszbl", "qw.resz"];
const WINDOW_FULLSCREEN: &[&str] = &["Qwindow.fullscreen", "qwd.fullsc", "qw.fls"];
const WINDOW_BACKGROUND: &[&str] = &["Qwindow.background.color", "qwd.bg.clr", "qw.bgc"];
const WINDOW_CLOSE: &[&str] = &["kill.qwindow/"];

const WARN_CLOSE: &[&str] = &["kill.wwindow/"];
const WARN_TITLE: &[&str] = &["Wwindow.uptext"];
const WARN_BACKGROUND: &[&str] = &["Wwindow.background.color"];
const WARN_SCREEN: &[&str] = &["warn.screen"];

const INSERT_TEXT: &[&str] = &["insert.text", "ins.txt", "i.tx"];
const INSERT_LINK: &[&str] = &["insert.link"];
const INSERT_BUTTON: &[&str] = &["insert.button", "ins.btn", "i.bt"];
const INSERT_INPUT: &[&str] = &["insert.inputter"];

const WIDGET_TEXT_COLOR: &[&str] = &[
    ".text.color",
    ".txt.clr",
    ".t$",
    ".font.color",
    ".fnt.clr",
    ".f$",
];
const WIDGET_TEXT: &[&str] = &[".text", ".txt", ".tx"];
const WIDGET_LINK: &[&str] = &[".link"];
const WIDGET_BACKGROUND: &[&str] = &[".background.color", ".bg.clr", ".bgc"];
const WIDGET_FONT_FAMILY: &[&str] = &[".font.font", ".fnt.font", ".ffnt"];
const WIDGET_FONT_SIZE: &[&str] = &[".size", ".font.size", ".fnt.sz", ".fsz"];
const WIDGET_SIZE: &[&str] = &[".geometry.size", ".geom.sz", ".ge.sz"];
const WIDGET_POSITION: &[&str] = &[".cordinates", ".cordint", ".c$"];

// -------------------------------------------------------------------------
// 规则表
// -------------------------------------------------------------------------

type RuleFn = fn(&str, usize) -> Result<Option<Statement>, ParseError>;

/// 一条语句规则
pub struct StatementRule {
    /// 规则名（与语句类型名一致）
    pub name: &'static str,
    /// 不匹配时返回 `Ok(None)`
    pub parse: RuleFn,
}

/// 按优先级排列的语句规则
pub const STATEMENT_RULES: &[StatementRule] = &[
    StatementRule { name: "Start", parse: parse_start },
    StatementRule { name: "Stop", parse: parse_stop },
    StatementRule { name: "ConsoleWrite", parse: parse_console_write },
    StatementRule { name: "Input", parse: parse_input },
    StatementRule { name: "Assign", parse: parse_assign },
    StatementRule { name: "MathEcho", parse: parse_math_echo },
    StatementRule { name: "WindowOpen", parse: parse_window_open },
    StatementRule { name: "WindowTitle", parse: parse_window_title },
    StatementRule { name: "WindowSize", parse: parse_window_size },
    StatementRule { name: "WindowResizable", parse: parse_window_resizable },
    StatementRule { name: "WindowFullscreen", parse: parse_window_fullscreen },
    StatementRule { name: "WindowBackground", parse: parse_window_background },
    StatementRule { name: "WindowClose", parse: parse_window_close },
    StatementRule { name: "WarnClose", parse: parse_warn_close },
    StatementRule { name: "WarnTitle", parse: parse_warn_title },
    StatementRule { name: "WarnBackground", parse: parse_warn_background },
    StatementRule { name: "InsertText", parse: parse_insert_text },
    StatementRule { name: "InsertLink", parse: parse_insert_link },
    StatementRule { name: "InsertButton", parse: parse_insert_button },
    StatementRule { name: "InsertInput", parse: parse_insert_input },
    StatementRule { name: "WarnScreen", parse: parse_warn_screen },
    StatementRule { name: "Conditional", parse: parse_conditional },
    StatementRule { name: "WidgetTextColor", parse: parse_widget_text_color },
    StatementRule { name: "WidgetText", parse: parse_widget_text },
    StatementRule { name: "WidgetLink", parse: parse_widget_link },
    StatementRule { name: "WidgetBackground", parse: parse_widget_background },
    StatementRule { name: "WidgetFontFamily", parse: parse_widget_font_family },
    StatementRule { name: "WidgetFontSize", parse: parse_widget_font_size },
    StatementRule { name: "WidgetSize", parse: parse_widget_size },
    StatementRule { name: "WidgetPosition", parse: parse_widget_position },
];

/// 阶段 2 解析器
pub struct Phase2Parser {
    rules: &'static [StatementRule],
}

impl Phase2Parser {
    pub fn new() -> Self {
        Self {
            rules: STATEMENT_RULES,
        }
    }

    /// 解析单个块
    pub fn parse_block(&self, block: Block) -> Result<Statement, ParseError> {
        match block {
            Block::SingleLine(line) => self.parse_line(&line.text, line.line_number),
            Block::Event { header, action, .. } => {
                let action = self.parse_line(&action.text, action.line_number)?;
                Ok(Statement::EventBlock {
                    header: header.text,
                    action: Box::new(action),
                })
            }
        }
    }

    /// 按规则表解析一行
    pub fn parse_line(&self, line: &str, line_number: usize) -> Result<Statement, ParseError> {
        let line = line.trim();
        for rule in self.rules {
            if let Some(stmt) = (rule.parse)(line, line_number)? {
                return Ok(stmt);
            }
        }
        Err(ParseError::UnrecognizedStatement {
            line: line_number,
            text: line.to_string(),
        })
    }
}

impl Default for Phase2Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// 用默认规则表解析一行
pub fn parse_statement(line: &str, line_number: usize) -> Result<Statement, ParseError> {
    Phase2Parser::new().parse_line(line, line_number)
}

// -------------------------------------------------------------------------
// 匹配辅助
// -------------------------------------------------------------------------

/// 调用形式：`alias(inner)after`
struct CallMatch<'a> {
    alias: &'static str,
    inner: &'a str,
    after: &'a str,
}

impl CallMatch<'_> {
    fn command(&self) -> String {
        self.alias.trim_start_matches('.').to_string()
    }
}

/// 依次尝试每个写法，要求写法之后（可有空白）紧跟一对括号
fn match_call<'a>(text: &'a str, aliases: &[&'static str]) -> Option<CallMatch<'a>> {
    aliases.iter().find_map(|alias| {
        let rest = text.strip_prefix(alias)?.trim_start();
        let (inner, after) = split_call(rest)?;
        Some(CallMatch {
            alias: *alias,
            inner,
            after: after.trim(),
        })
    })
}

/// 只接受 `alias(inner)`，括号后不能有其他内容
fn match_plain_call<'a>(text: &'a str, aliases: &[&'static str]) -> Option<&'a str> {
    match_call(text, aliases)
        .filter(|m| m.after.is_empty())
        .map(|m| m.inner)
}

/// 赋值形式：`alias = value`
fn match_assignment<'a>(text: &'a str, aliases: &[&'static str]) -> Option<&'a str> {
    aliases.iter().find_map(|alias| {
        let rest = text.strip_prefix(alias)?.trim_start();
        let value = rest.strip_prefix('=')?;
        (!value.starts_with('=')).then(|| value.trim())
    })
}

fn match_exact(text: &str, aliases: &[&str]) -> bool {
    aliases.contains(&text)
}

/// 拆分两个参数，个数不对时报告参数错误
fn two_args(
    m: &CallMatch<'_>,
    line: &str,
    line_number: usize,
) -> Result<(Expr, Expr), ParseError> {
    let args = split_args(m.inner);
    if args.len() != 2 {
        return Err(ParseError::ArgumentCount {
            line: line_number,
            text: line.to_string(),
            command: m.command(),
            expected: 2,
            found: args.len(),
        });
    }
    Ok((parse_expression(args[0]), parse_expression(args[1])))
}

/// 无参数的插入语句：`alias() as name`
fn insert_without_args(
    line: &str,
    line_number: usize,
    aliases: &[&'static str],
) -> Result<Option<String>, ParseError> {
    let Some(m) = match_call(line, aliases) else {
        return Ok(None);
    };
    let Some(name) = parse_as_name(m.after) else {
        return Ok(None);
    };
    let args = split_args(m.inner);
    if !args.is_empty() {
        return Err(ParseError::ArgumentCount {
            line: line_number,
            text: line.to_string(),
            command: m.command(),
            expected: 0,
            found: args.len(),
        });
    }
    Ok(Some(name.to_string()))
}

/// 控件操作：`name<alias>(inner)`
fn match_widget_call<'a>(line: &'a str, aliases: &[&'static str]) -> Option<(&'a str, CallMatch<'a>)> {
    let (name, rest) = split_widget_name(line)?;
    let m = match_call(rest, aliases).filter(|m| m.after.is_empty())?;
    Some((name, m))
}

/// 单参数控件操作
fn widget_single(
    line: &str,
    aliases: &[&'static str],
    build: fn(String, Expr) -> Statement,
) -> Option<Statement> {
    let (name, m) = match_widget_call(line, aliases)?;
    Some(build(name.to_string(), parse_expression(m.inner)))
}

// -------------------------------------------------------------------------
// 生命周期与基础语句
// -------------------------------------------------------------------------

fn parse_start(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_exact(line, START).then_some(Statement::Start))
}

fn parse_stop(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_exact(line, STOP).then_some(Statement::Stop))
}

fn parse_console_write(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_plain_call(line, CONSOLE_WRITE).map(|inner| Statement::ConsoleWrite(parse_expression(inner))))
}

fn parse_input(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_plain_call(line, INPUT).map(|inner| Statement::Input(parse_expression(inner))))
}

fn parse_assign(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    let rest = ASSIGN
        .iter()
        .find_map(|kw| line.strip_prefix(kw).filter(|r| r.starts_with(char::is_whitespace)))
        .or_else(|| strip_keyword_ignore_case(line, ASSIGN_WORD, ' '));
    let Some(rest) = rest else {
        return Ok(None);
    };
    let Some((name, expr)) = rest.split_once('=') else {
        return Ok(None);
    };
    let name = name.trim();
    if !is_identifier(name) {
        return Ok(None);
    }
    Ok(Some(Statement::Assign {
        name: name.to_string(),
        expr: parse_expression(expr),
    }))
}

fn parse_math_echo(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_plain_call(line, MATH_ECHO).map(|inner| Statement::MathEcho(parse_expression(inner))))
}

// -------------------------------------------------------------------------
// 主窗口
// -------------------------------------------------------------------------

fn parse_window_open(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_exact(line, WINDOW_OPEN).then_some(Statement::WindowOpen))
}

fn parse_window_title(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_plain_call(line, WINDOW_TITLE).map(|inner| Statement::WindowTitle(parse_expression(inner))))
}

fn parse_window_size(line: &str, line_number: usize) -> Result<Option<Statement>, ParseError> {
    let Some(m) = match_call(line, WINDOW_SIZE).filter(|m| m.after.is_empty()) else {
        return Ok(None);
    };
    let (width, height) = two_args(&m, line, line_number)?;
    Ok(Some(Statement::WindowSize { width, height }))
}

fn parse_window_resizable(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_assignment(line, WINDOW_RESIZABLE)
        .map(|value| Statement::WindowResizable(parse_bool_argument(value))))
}

fn parse_window_fullscreen(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_assignment(line, WINDOW_FULLSCREEN)
        .map(|value| Statement::WindowFullscreen(parse_bool_argument(value))))
}

fn parse_window_background(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_plain_call(line, WINDOW_BACKGROUND)
        .map(|inner| Statement::WindowBackground(parse_expression(inner))))
}

fn parse_window_close(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_exact(line, WINDOW_CLOSE).then_some(Statement::WindowClose))
}

// -------------------------------------------------------------------------
// warn 窗口
// -------------------------------------------------------------------------

fn parse_warn_close(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_exact(line, WARN_CLOSE).then_some(Statement::WarnClose))
}

fn parse_warn_title(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_plain_call(line, WARN_TITLE).map(|inner| Statement::WarnTitle(parse_expression(inner))))
}

fn parse_warn_background(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(match_plain_call(line, WARN_BACKGROUND)
        .map(|inner| Statement::WarnBackground(parse_expression(inner))))
}

/// `warn.screen('message' <option>)`
fn parse_warn_screen(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    let Some(inner) = match_plain_call(line, WARN_SCREEN) else {
        return Ok(None);
    };
    let inner = inner.trim();
    let Some(body) = inner.strip_suffix('>') else {
        return Ok(None);
    };
    let Some(lt) = body.rfind('<') else {
        return Ok(None);
    };
    let message = body[..lt].trim();
    let option_label = body[lt + 1..].trim();
    if message.is_empty() || option_label.is_empty() {
        return Ok(None);
    }
    Ok(Some(Statement::WarnScreen {
        message: parse_expression(message),
        option_label: option_label.to_string(),
    }))
}

// -------------------------------------------------------------------------
// 插入控件
// -------------------------------------------------------------------------

fn parse_insert_text(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    let Some(m) = match_call(line, INSERT_TEXT) else {
        return Ok(None);
    };
    Ok(parse_as_name(m.after).map(|name| Statement::InsertText {
        text: parse_expression(m.inner),
        name: name.to_string(),
    }))
}

fn parse_insert_link(line: &str, line_number: usize) -> Result<Option<Statement>, ParseError> {
    Ok(insert_without_args(line, line_number, INSERT_LINK)?.map(|name| Statement::InsertLink { name }))
}

fn parse_insert_button(line: &str, line_number: usize) -> Result<Option<Statement>, ParseError> {
    Ok(insert_without_args(line, line_number, INSERT_BUTTON)?.map(|name| Statement::InsertButton { name }))
}

fn parse_insert_input(line: &str, line_number: usize) -> Result<Option<Statement>, ParseError> {
    Ok(insert_without_args(line, line_number, INSERT_INPUT)?.map(|name| Statement::InsertInput { name }))
}

// -------------------------------------------------------------------------
// 条件语句
// -------------------------------------------------------------------------

/// `if L = R: then A` / `elif L = R: then A` / `else: [then] A`
fn parse_conditional(line: &str, line_number: usize) -> Result<Option<Statement>, ParseError> {
    let (kind, rest) = if let Some(rest) = strip_keyword_ignore_case(line, "if", ' ') {
        (ConditionalKind::If, rest)
    } else if let Some(rest) = strip_keyword_ignore_case(line, "elif", ' ') {
        (ConditionalKind::Elif, rest)
    } else if let Some(rest) = strip_keyword_ignore_case(line, "else", ':') {
        (ConditionalKind::Else, rest)
    } else {
        return Ok(None);
    };

    let Some(colon) = find_top_level(rest, ":") else {
        return Ok(None);
    };
    let condition = rest[..colon].trim();
    let action_text = strip_then(rest[colon + 1..].trim());
    if action_text.is_empty() {
        return Ok(None);
    }

    let comparison = match kind {
        ConditionalKind::Else => {
            if !condition.is_empty() {
                return Ok(None);
            }
            None
        }
        ConditionalKind::If | ConditionalKind::Elif => match parse_comparison(condition) {
            Some(comparison) => Some(comparison),
            None => return Ok(None),
        },
    };

    let action = parse_conditional_action(action_text, line, line_number)?;
    Ok(Some(Statement::Conditional {
        kind,
        comparison,
        action: Box::new(action),
    }))
}

fn strip_then(text: &str) -> &str {
    strip_keyword_ignore_case(text, "then", ' ')
        .map(str::trim)
        .unwrap_or(text)
}

/// `left = right` 或 `left == right`
fn parse_comparison(condition: &str) -> Option<Comparison> {
    let (pos, len) = find_top_level(condition, "==")
        .map(|pos| (pos, 2))
        .or_else(|| find_top_level(condition, "=").map(|pos| (pos, 1)))?;
    let left = condition[..pos].trim();
    let right = condition[pos + len..].trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some(Comparison {
        left: parse_expression(left),
        right: parse_expression(right),
    })
}

/// 条件动作：不能是 event 块或另一个条件语句
fn parse_conditional_action(
    action: &str,
    line: &str,
    line_number: usize,
) -> Result<Statement, ParseError> {
    if is_event_marker(action) {
        return Err(ParseError::NestedEventBlock {
            line: line_number,
            text: line.to_string(),
        });
    }
    let stmt = parse_statement(action, line_number).map_err(|err| match err {
        ParseError::UnrecognizedStatement { .. } => ParseError::UnrecognizedStatement {
            line: line_number,
            text: line.to_string(),
        },
        other => other,
    })?;
    if matches!(stmt, Statement::Conditional { .. }) {
        return Err(ParseError::NestedConditional {
            line: line_number,
            text: line.to_string(),
        });
    }
    Ok(stmt)
}

// -------------------------------------------------------------------------
// 控件样式与布局
// -------------------------------------------------------------------------

fn parse_widget_text_color(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(widget_single(line, WIDGET_TEXT_COLOR, |name, value| {
        Statement::WidgetTextColor { name, value }
    }))
}

fn parse_widget_text(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(widget_single(line, WIDGET_TEXT, |name, value| Statement::WidgetText { name, value }))
}

fn parse_widget_link(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(widget_single(line, WIDGET_LINK, |name, url| Statement::WidgetLink { name, url }))
}

fn parse_widget_background(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(widget_single(line, WIDGET_BACKGROUND, |name, value| {
        Statement::WidgetBackground { name, value }
    }))
}

fn parse_widget_font_family(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    Ok(widget_single(line, WIDGET_FONT_FAMILY, |name, value| {
        Statement::WidgetFontFamily { name, value }
    }))
}

fn parse_widget_font_size(line: &str, _: usize) -> Result<Option<Statement>, ParseError> {
    let Some((name, rest)) = split_widget_name(line) else {
        return Ok(None);
    };
    Ok(match_assignment(rest, WIDGET_FONT_SIZE).map(|value| Statement::WidgetFontSize {
        name: name.to_string(),
        value: parse_expression(value),
    }))
}

fn parse_widget_size(line: &str, line_number: usize) -> Result<Option<Statement>, ParseError> {
    let Some((name, m)) = match_widget_call(line, WIDGET_SIZE) else {
        return Ok(None);
    };
    let (width, height) = two_args(&m, line, line_number)?;
    Ok(Some(Statement::WidgetSize {
        name: name.to_string(),
        width,
        height,
    }))
}

fn parse_widget_position(line: &str, line_number: usize) -> Result<Option<Statement>, ParseError> {
    let Some((name, m)) = match_widget_call(line, WIDGET_POSITION) else {
        return Ok(None);
    };
    let (x, y) = two_args(&m, line, line_number)?;
    Ok(Some(Statement::WidgetPosition {
        name: name.to_string(),
        x,
        y,
    }))
}
