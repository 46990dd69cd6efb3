use serde_json::Value;

use crate::dynamodb::value::to_pretty_json;

/// Read-only, scrollable pretty JSON of one field.
#[derive(Debug, Clone)]
pub struct JsonFieldView {
    field: String,
    lines: Vec<String>,
    offset: usize,
}

impl JsonFieldView {
    pub fn new(field: &str, value: &Value) -> Result<Self, serde_json::Error> {
        let text = to_pretty_json(value)?;
        Ok(Self {
            field: field.to_string(),
            lines: text.lines().map(str::to_string).collect(),
            offset: 0,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Lines visible in a viewport of `height` rows.
    pub fn visible(&self, height: usize) -> &[String] {
        let end = self.offset.saturating_add(height).min(self.lines.len());
        &self.lines[self.offset.min(end)..end]
    }

    pub fn scroll(&mut self, delta: isize, height: usize) {
        let max = self.lines.len().saturating_sub(height.max(1));
        let target = self.offset as isize + delta;
        self.offset = target.clamp(0, max as isize) as usize;
    }

    pub fn page_down(&mut self, height: usize) {
        self.scroll(page_step(height), height);
    }

    pub fn page_up(&mut self, height: usize) {
        self.scroll(-page_step(height), height);
    }
}

/// One screen minus a line of overlap.
fn page_step(height: usize) -> isize {
    height.saturating_sub(1).max(1) as isize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(len: usize) -> JsonFieldView {
        let values: Vec<Value> = (0..len).map(|i| Value::from(i as u64)).collect();
        // "[", one line per element, "]"
        JsonFieldView::new("list", &Value::Array(values)).unwrap()
    }

    #[test]
    fn renders_four_space_indent() {
        let view = JsonFieldView::new("tags", &serde_json::json!(["a", "b"])).unwrap();
        assert_eq!(view.lines(), &["[", "    \"a\",", "    \"b\"", "]"]);
    }

    #[test]
    fn line_scroll_is_clamped() {
        let mut view = view(8);
        assert_eq!(view.lines().len(), 10);
        view.scroll(-1, 4);
        assert_eq!(view.offset(), 0);
        for _ in 0..20 {
            view.scroll(1, 4);
        }
        assert_eq!(view.offset(), 6);
        assert_eq!(view.visible(4).len(), 4);
    }

    #[test]
    fn pages_by_height_minus_one() {
        let mut view = view(30);
        view.page_down(10);
        assert_eq!(view.offset(), 9);
        view.page_down(10);
        assert_eq!(view.offset(), 18);
        view.page_up(10);
        assert_eq!(view.offset(), 9);
        view.page_down(10);
        view.page_down(10);
        assert_eq!(view.offset(), 22);
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut view = view(1);
        view.page_down(10);
        assert_eq!(view.offset(), 0);
        assert_eq!(view.visible(10).len(), 3);
    }
}
