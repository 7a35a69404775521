//! Collision-free builders for email addresses, fixed-length numeric codes,
//! and date-keyed identifiers.
//!
//! Each builder owns a history set of everything it has emitted and resolves
//! collisions with a bounded retry, never an unbounded loop. Inner state sits
//! behind a lock, so builders take `&self` and are safe to share.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{Datelike, NaiveDate, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::circular::Circular;
use crate::generator::{GenError, Generator};
use crate::sample;

/// Separators rotated between adjacent name parts of an email address.
const SEPARATORS: [&str; 3] = [".", "_", "-"];

/// Domains used when none are configured.
pub const DEFAULT_DOMAINS: [&str; 3] = ["example.com", "example.net", "example.org"];

/// Code length used by [`CodeBuilder::code`].
pub const DEFAULT_CODE_LENGTH: u32 = 4;

/// How many full passes over a rotation are tried before giving up or
/// mutating the candidate.
const ROTATION_RESETS: usize = 2;

/// Ceiling on digit-append restarts in [`EmailBuilder::mail`]. Every restart
/// widens the candidate space tenfold, so this is unreachable in practice.
const MAX_MAIL_RESTARTS: u32 = 100;

struct EmailState {
    separators: Circular<std::vec::IntoIter<&'static str>>,
    domain_cursor: usize,
    history: HashSet<String>,
    rng: StdRng,
}

/// Builds email addresses that never repeat within the builder's lifetime.
pub struct EmailBuilder {
    domains: Vec<String>,
    inner: Mutex<EmailState>,
}

impl EmailBuilder {
    /// A builder over [`DEFAULT_DOMAINS`].
    pub fn new() -> Self {
        Self::with_domains(DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect())
            .expect("default domains are valid")
    }

    /// A builder over the given domain list. The list and every entry must
    /// be non-empty.
    pub fn with_domains(domains: Vec<String>) -> Result<Self, GenError> {
        Self::build(domains, StdRng::from_os_rng())
    }

    /// [`EmailBuilder::with_domains`] with a fixed seed for the digit
    /// fallback.
    pub fn with_domains_seeded(domains: Vec<String>, seed: u64) -> Result<Self, GenError> {
        Self::build(domains, StdRng::seed_from_u64(seed))
    }

    fn build(domains: Vec<String>, rng: StdRng) -> Result<Self, GenError> {
        if domains.is_empty() {
            return Err(GenError::InvalidArgument(
                "domain list is empty".to_string(),
            ));
        }
        if domains.iter().any(|d| d.is_empty()) {
            return Err(GenError::InvalidArgument("domain is empty".to_string()));
        }
        Ok(Self {
            domains,
            inner: Mutex::new(EmailState {
                separators: Circular::prefilled(SEPARATORS.to_vec()),
                domain_cursor: 0,
                history: HashSet::new(),
                rng,
            }),
        })
    }

    /// Build the next unique address from the given name parts.
    ///
    /// Parts are joined with separators drawn round-robin from `. _ -`, the
    /// next domain is appended round-robin, and the result is lower-cased.
    /// On collision the domain advances; after two full domain passes a
    /// random digit is appended to the last part and the search restarts
    /// from the first domain.
    pub fn mail(&self, parts: &[&str]) -> Result<String, GenError> {
        if parts.is_empty() {
            return Err(GenError::InvalidArgument(
                "name parts list is empty".to_string(),
            ));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(GenError::InvalidArgument("name part is empty".to_string()));
        }

        let mut state = self.inner.lock().expect("email state lock poisoned");
        let mut parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        let mut first_domain = state.domain_cursor;
        for _ in 0..MAX_MAIL_RESTARTS {
            let mut local = parts[0].clone();
            for part in &parts[1..] {
                let separator = state.separators.next_value()?;
                local.push_str(separator);
                local.push_str(part);
            }
            for offset in 0..self.domains.len() * ROTATION_RESETS {
                let index = (first_domain + offset) % self.domains.len();
                let candidate = format!("{local}@{}", self.domains[index]).to_lowercase();
                if !state.history.contains(&candidate) {
                    state.history.insert(candidate.clone());
                    state.domain_cursor = (index + 1) % self.domains.len();
                    return Ok(candidate);
                }
            }
            let digit = sample::long_between(&mut state.rng, 0, 10)? as u32;
            let last = parts.len() - 1;
            parts[last].push(char::from_digit(digit, 10).expect("digit is below ten"));
            first_domain = 0;
        }
        Err(GenError::Exhausted {
            attempts: u64::from(MAX_MAIL_RESTARTS),
        })
    }
}

impl Default for EmailBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct CodeState {
    history: HashSet<String>,
    rng: StdRng,
}

/// Builds fixed-length numeric codes that never repeat within the builder's
/// lifetime.
pub struct CodeBuilder {
    inner: Mutex<CodeState>,
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// A builder with a fixed seed for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            inner: Mutex::new(CodeState {
                history: HashSet::new(),
                rng,
            }),
        }
    }

    /// The next unique code of [`DEFAULT_CODE_LENGTH`] digits.
    pub fn code(&self) -> Result<String, GenError> {
        self.code_of_length(DEFAULT_CODE_LENGTH)
    }

    /// The next unique zero-left-padded code of exactly `length` digits.
    ///
    /// Starts from a uniform draw in `[0, 10^length)` and steps by one with
    /// wraparound on collision; two full wraps without success exhaust the
    /// builder for that length.
    pub fn code_of_length(&self, length: u32) -> Result<String, GenError> {
        if length == 0 || length > 18 {
            return Err(GenError::InvalidArgument(format!(
                "code length {length} is not between 1 and 18"
            )));
        }
        let space = 10u64.pow(length);
        let mut state = self.inner.lock().expect("code state lock poisoned");
        let start = sample::long_between(&mut state.rng, 0, space as i64)? as u64;
        let budget = space * ROTATION_RESETS as u64;
        for offset in 0..budget {
            let value = (start + offset) % space;
            let candidate = format!("{value:0width$}", width = length as usize);
            if !state.history.contains(&candidate) {
                state.history.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(GenError::Exhausted { attempts: budget })
    }
}

impl Default for CodeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

struct IdState {
    history: HashSet<String>,
    rng: StdRng,
}

/// Builds date-keyed identifiers (`YYMMDD` + 4-digit control number) that
/// never repeat within the builder's lifetime.
pub struct IdentifierBuilder {
    separator: Option<char>,
    inner: Mutex<IdState>,
}

impl IdentifierBuilder {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// A builder with a fixed seed for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            separator: None,
            inner: Mutex::new(IdState {
                history: HashSet::new(),
                rng,
            }),
        }
    }

    /// Insert `separator` between the date stamp and the control number.
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    /// The next unique identifier for today's UTC date.
    pub fn identifier(&self) -> Result<String, GenError> {
        self.identifier_for(Utc::now().date_naive())
    }

    /// The next unique identifier for the given date.
    ///
    /// The control number starts from a uniform draw in `[0, 10000)` and
    /// steps by one with wraparound at `9999`; two full wraps without
    /// success exhaust the builder for that date.
    pub fn identifier_for(&self, date: NaiveDate) -> Result<String, GenError> {
        const CONTROL_SPACE: u64 = 10_000;
        let stamp = format!(
            "{:02}{:02}{:02}",
            date.year().rem_euclid(100),
            date.month(),
            date.day()
        );
        let mut state = self.inner.lock().expect("identifier state lock poisoned");
        let start = sample::long_between(&mut state.rng, 0, CONTROL_SPACE as i64)? as u64;
        let budget = CONTROL_SPACE * ROTATION_RESETS as u64;
        for offset in 0..budget {
            let control = (start + offset) % CONTROL_SPACE;
            let candidate = match self.separator {
                Some(separator) => format!("{stamp}{separator}{control:04}"),
                None => format!("{stamp}{control:04}"),
            };
            if !state.history.contains(&candidate) {
                state.history.insert(candidate.clone());
                return Ok(candidate);
            }
        }
        Err(GenError::Exhausted { attempts: budget })
    }
}

impl Default for IdentifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
