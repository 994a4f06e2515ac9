use serde::Serialize;
use std::io::Write;

/// Writes records as newline-delimited JSON.
///
/// Each call to [`NdjsonEmitter::emit_batch`] writes one page's records in
/// order and flushes, so a consumer reading stdout sees whole pages as soon as
/// they are extracted.
pub struct NdjsonEmitter<W: Write> {
    writer: W,
    lines_written: usize,
}

impl<W: Write> NdjsonEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            lines_written: 0,
        }
    }

    /// Serialize one record as a single JSON line.
    pub fn emit<R: Serialize>(&mut self, record: &R) -> Result<(), std::io::Error> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.lines_written += 1;
        Ok(())
    }

    /// Emit a page's records in order, then flush.
    pub fn emit_batch<R: Serialize>(&mut self, records: &[R]) -> Result<usize, std::io::Error> {
        for record in records {
            self.emit(record)?;
        }
        self.writer.flush()?;
        Ok(records.len())
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::BookListing;

    fn book(title: &str, price: Option<u64>) -> BookListing {
        BookListing {
            title: title.to_string(),
            price,
            availability: Some("In stock".to_string()),
            rating: Some("Three".to_string()),
            url: format!(
                "https://books.toscrape.com/catalogue/{}/index.html",
                title.to_lowercase()
            ),
        }
    }

    #[test]
    fn test_single_record_is_one_line() {
        let mut emitter = NdjsonEmitter::new(Vec::new());
        emitter.emit(&book("Sapiens", Some(54))).unwrap();

        let output = String::from_utf8(emitter.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 1);
        assert!(output.ends_with('\n'));

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["title"], "Sapiens");
        assert_eq!(parsed["price"], 54);
        assert_eq!(parsed["rating"], "Three");
    }

    #[test]
    fn test_batch_preserves_order() {
        let mut emitter = NdjsonEmitter::new(Vec::new());
        let written = emitter
            .emit_batch(&[book("Alpha", Some(1)), book("Beta", None), book("Gamma", Some(3))])
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(emitter.lines_written(), 3);

        let output = String::from_utf8(emitter.into_inner()).unwrap();
        let titles: Vec<String> = output
            .lines()
            .map(|line| {
                let value: serde_json::Value = serde_json::from_str(line).unwrap();
                value["title"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
        assert!(output.lines().nth(1).unwrap().contains(r#""price":null"#));
    }

    #[test]
    fn test_empty_batch_writes_nothing() {
        let mut emitter = NdjsonEmitter::new(Vec::new());
        let written = emitter.emit_batch::<BookListing>(&[]).unwrap();
        assert_eq!(written, 0);
        assert_eq!(emitter.into_inner(), Vec::<u8>::new());
    }

    #[test]
    fn test_titles_with_newlines_stay_on_one_line() {
        let mut emitter = NdjsonEmitter::new(Vec::new());
        emitter.emit(&book("Line\nBreak", None)).unwrap();
        let output = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(output.lines().count(), 1);
    }
}
