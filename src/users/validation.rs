//! Field rules for user payloads, path ids and pagination.
//!
//! Every field is checked against an ordered list of named rules. A missing or
//! empty value (after trimming, for trimmed fields) reports only `required`, a
//! non-string value only `string`;
//! otherwise every failing rule contributes its message.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::config::EmailRulesConfig;
use crate::error::ValidationErrors;
use crate::users::{
    email::{self, DomainResolver},
    messages,
    repo::{StoreResult, UserStore},
};

pub const NAME_MIN_CHARS: usize = 2;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const MAX_CHARS: usize = 255;
pub const DEFAULT_PER_PAGE: i64 = 15;
pub const MAX_PER_PAGE: i64 = 100;

lazy_static! {
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").unwrap();
    static ref LOWER_RE: Regex = Regex::new(r"[a-z]").unwrap();
    static ref UPPER_RE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref DIGIT_RE: Regex = Regex::new(r"[0-9]").unwrap();
}

pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Lowercase, uppercase and digit all present, in any order.
pub fn has_password_mix(password: &str) -> bool {
    LOWER_RE.is_match(password) && UPPER_RE.is_match(password) && DIGIT_RE.is_match(password)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub enum Check {
    Local(fn(&str) -> bool),
    /// Address syntax, plus a DNS lookup of the domain when `dns` is set.
    Email { dns: bool },
    /// No other record owns the address.
    Unique { ignore: Option<i64> },
}

pub struct Rule {
    pub name: &'static str,
    pub message: &'static str,
    pub check: Check,
}

impl Rule {
    fn local(name: &'static str, message: &'static str, f: fn(&str) -> bool) -> Self {
        Self {
            name,
            message,
            check: Check::Local(f),
        }
    }
}

/// Collaborators needed by rules that look outside the value itself.
pub struct RuleContext<'a> {
    pub store: &'a dyn UserStore,
    pub resolver: &'a dyn DomainResolver,
}

pub struct FieldRules {
    pub field: &'static str,
    /// Strip surrounding whitespace before checking.
    pub trim: bool,
    pub required: &'static str,
    pub string: &'static str,
    pub rules: Vec<Rule>,
}

impl FieldRules {
    pub fn name() -> Self {
        Self {
            field: "name",
            trim: true,
            required: messages::NAME_REQUIRED,
            string: messages::NAME_STRING,
            rules: vec![
                Rule::local("min", messages::NAME_MIN, |s| char_len(s) >= NAME_MIN_CHARS),
                Rule::local("max", messages::NAME_MAX, |s| char_len(s) <= MAX_CHARS),
                Rule::local("regex", messages::NAME_REGEX, is_valid_name),
            ],
        }
    }

    /// `ignore` is the id of the record being edited, if any.
    pub fn email(options: EmailRulesConfig, ignore: Option<i64>) -> Self {
        let mut rules = vec![
            Rule {
                name: "email",
                message: messages::EMAIL_EMAIL,
                check: Check::Email {
                    dns: options.check_dns,
                },
            },
            Rule::local("max", messages::EMAIL_MAX, |s| char_len(s) <= MAX_CHARS),
            Rule {
                name: "unique",
                message: messages::EMAIL_UNIQUE,
                check: Check::Unique { ignore },
            },
        ];
        if options.require_lowercase {
            rules.push(Rule::local("lowercase", messages::EMAIL_LOWERCASE, |s| {
                s.to_lowercase() == s
            }));
        }
        Self {
            field: "email",
            trim: true,
            required: messages::EMAIL_REQUIRED,
            string: messages::EMAIL_STRING,
            rules,
        }
    }

    pub fn password() -> Self {
        Self {
            field: "password",
            trim: false,
            required: messages::PASSWORD_REQUIRED,
            string: messages::PASSWORD_STRING,
            rules: vec![
                Rule::local("min", messages::PASSWORD_MIN, |s| char_len(s) >= PASSWORD_MIN_CHARS),
                Rule::local("max", messages::PASSWORD_MAX, |s| char_len(s) <= MAX_CHARS),
                Rule::local("regex", messages::PASSWORD_REGEX, has_password_mix),
            ],
        }
    }

    /// Checks `raw` and returns the (trimmed) string when every rule passes.
    /// Violations are appended to `errors` under this field's name.
    pub async fn apply(
        &self,
        raw: &Value,
        ctx: &RuleContext<'_>,
        errors: &mut ValidationErrors,
    ) -> StoreResult<Option<String>> {
        let value = match raw {
            Value::Null => None,
            Value::String(s) => {
                let s = if self.trim { s.trim() } else { s.as_str() };
                if s.is_empty() {
                    None
                } else {
                    Some(s)
                }
            }
            Value::Array(a) if a.is_empty() => None,
            Value::Object(o) if o.is_empty() => None,
            _ => {
                errors.add(self.field, self.string);
                return Ok(None);
            }
        };
        let Some(value) = value else {
            errors.add(self.field, self.required);
            return Ok(None);
        };

        let mut failed = Vec::new();
        for rule in &self.rules {
            if !rule.passes(value, ctx).await? {
                debug!(field = self.field, rule = rule.name, "rule failed");
                failed.push(rule.message);
            }
        }

        if failed.is_empty() {
            Ok(Some(value.to_string()))
        } else {
            errors.extend(self.field, failed);
            Ok(None)
        }
    }
}

impl Rule {
    async fn passes(&self, value: &str, ctx: &RuleContext<'_>) -> StoreResult<bool> {
        let ok = match &self.check {
            Check::Local(f) => f(value),
            Check::Email { dns } => {
                if !email::is_valid_syntax(value) {
                    false
                } else if !*dns {
                    true
                } else {
                    match email::domain_of(value) {
                        Some(domain) => ctx.resolver.accepts_mail(domain).await,
                        None => false,
                    }
                }
            }
            Check::Unique { ignore } => {
                let normalized = value.to_lowercase();
                !ctx.store.email_taken(&normalized, *ignore).await?
            }
        };
        Ok(ok)
    }
}

/// Parses a path id: must be an integer greater than zero.
pub fn parse_id(raw: &str) -> Result<i64, ValidationErrors> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        Ok(_) => Err(ValidationErrors::single("id", messages::ID_MIN)),
        Err(_) => Err(ValidationErrors::single("id", messages::ID_INTEGER)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Validates the optional `page` / `per_page` query values.
pub fn page_request(
    page: Option<&str>,
    per_page: Option<&str>,
) -> Result<PageRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut request = PageRequest::default();

    if let Some(raw) = page {
        match raw.trim().parse::<i64>() {
            Ok(p) if p >= 1 => request.page = p,
            Ok(_) => errors.add("page", messages::PAGE_MIN),
            Err(_) => errors.add("page", messages::PAGE_INTEGER),
        }
    }

    if let Some(raw) = per_page {
        match raw.trim().parse::<i64>() {
            Ok(n) if n < 1 => errors.add("per_page", messages::PER_PAGE_MIN),
            Ok(n) if n > MAX_PER_PAGE => errors.add("per_page", messages::PER_PAGE_MAX),
            Ok(n) => request.per_page = n,
            Err(_) => errors.add("per_page", messages::PER_PAGE_INTEGER),
        }
    }

    if errors.is_empty() {
        Ok(request)
    } else {
        Err(errors)
    }
}
