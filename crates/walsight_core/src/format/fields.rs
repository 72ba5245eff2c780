//! Ordered `name=value` field writer.

use std::fmt::Display;

/// Quotes `bytes`, escaping anything outside printable ASCII.
#[must_use]
pub fn escape_bytes(bytes: &[u8]) -> String {
    format!("\"{}\"", bytes.escape_ascii())
}

/// Accumulates space-separated `name=value` fields in call order.
///
/// Nested messages render as `name={...}` and repeated messages as
/// `name=[{...} {...}]`.
#[derive(Debug, Default)]
pub(crate) struct Fields {
    out: String,
}

impl Fields {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn key(&mut self, name: &str) {
        if !self.out.is_empty() {
            self.out.push(' ');
        }
        self.out.push_str(name);
        self.out.push('=');
    }

    /// Scalar field.
    pub(crate) fn field(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.key(name);
        self.out.push_str(&value.to_string());
        self
    }

    /// Scalar field that is only written when present.
    pub(crate) fn optional(&mut self, name: &str, value: Option<impl Display>) -> &mut Self {
        if let Some(value) = value {
            self.field(name, value);
        }
        self
    }

    /// Byte-sequence field, quoted and escaped.
    pub(crate) fn bytes(&mut self, name: &str, value: &[u8]) -> &mut Self {
        self.key(name);
        self.out.push_str(&escape_bytes(value));
        self
    }

    /// String field, quoted and escaped like bytes.
    pub(crate) fn text(&mut self, name: &str, value: &str) -> &mut Self {
        self.bytes(name, value.as_bytes())
    }

    /// Nested message field.
    pub(crate) fn message(&mut self, name: &str, write: impl FnOnce(&mut Fields)) -> &mut Self {
        self.key(name);
        self.out.push_str(&braced(write));
        self
    }

    /// Repeated message field.
    pub(crate) fn list<T>(
        &mut self,
        name: &str,
        items: &[T],
        write: impl Fn(&mut Fields, &T),
    ) -> &mut Self {
        self.key(name);
        self.out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.out.push_str(&braced(|f| write(f, item)));
        }
        self.out.push(']');
        self
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

fn braced(write: impl FnOnce(&mut Fields)) -> String {
    let mut inner = Fields::new();
    write(&mut inner);
    format!("{{{}}}", inner.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_printable_and_control() {
        assert_eq!(escape_bytes(b""), "\"\"");
        assert_eq!(escape_bytes(b"foo1"), "\"foo1\"");
        assert_eq!(escape_bytes(b"a\"b"), "\"a\\\"b\"");
        assert_eq!(escape_bytes(&[0x00, 0xff, b'\n']), "\"\\x00\\xff\\n\"");
    }

    #[test]
    fn fields_in_call_order() {
        let mut f = Fields::new();
        f.field("id", 3)
            .text("name", "x")
            .optional("absent", None::<bool>)
            .optional("present", Some(false))
            .message("perm", |p| {
                p.field("perm_type", "WRITE");
            })
            .list("ops", &[1, 2], |f, n| {
                f.field("n", n);
            })
            .list("none", &[] as &[u8], |_, _| {});
        assert_eq!(
            f.finish(),
            "id=3 name=\"x\" present=false perm={perm_type=WRITE} ops=[{n=1} {n=2}] none=[]"
        );
    }

    #[test]
    fn empty_message() {
        let mut f = Fields::new();
        f.message("auth_enable", |_| {});
        assert_eq!(f.finish(), "auth_enable={}");
    }
}
