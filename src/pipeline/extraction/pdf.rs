use super::ExtractionError;

/// PDF text extraction abstraction (allows mocking for tests).
pub trait PdfExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;

    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, ExtractionError> {
        Ok(self.extract_pages(pdf_bytes)?.len())
    }
}

/// PDF text extractor using the pdf-extract crate.
/// Handles digital PDFs with embedded text layers.
pub struct PdfTextExtractor;

impl PdfExtractor for PdfTextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
            .map_err(|e| ExtractionError::PdfParsing(e.to_string()))
    }
}

/// Full document text: all pages joined with newlines.
pub fn extract_document_text(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = PdfTextExtractor.extract_pages(pdf_bytes)?;
    Ok(pages.join("\n"))
}

#[cfg(test)]
pub(crate) mod test_support {
    /// Generate a valid PDF with text using lopdf (the library that
    /// pdf-extract uses internally). Each input string becomes one line.
    pub fn make_test_pdf(lines: &[&str]) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        // One Tj per line, stepping down the page.
        let mut content = String::from("BT /F1 10 Tf 40 760 Td ");
        for (i, line) in lines.iter().enumerate() {
            let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
            if i > 0 {
                content.push_str("0 -14 Td ");
            }
            content.push_str(&format!("({escaped}) Tj "));
        }
        content.push_str("ET");

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::make_test_pdf;
    use super::*;

    #[test]
    fn extract_text_from_digital_pdf() {
        let pdf_bytes = make_test_pdf(&["Historia Clinica", "Identificacion: CC 1232835680"]);
        let text = extract_document_text(&pdf_bytes).unwrap();
        assert!(
            text.contains("1232835680"),
            "expected document number in extracted text, got: {text}"
        );
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let result = PdfTextExtractor.extract_pages(b"not a pdf");
        assert!(matches!(result, Err(ExtractionError::PdfParsing(_))));
    }

    #[test]
    fn page_count_matches_extraction() {
        let pdf_bytes = make_test_pdf(&["Factura Electronica No. FERO12345"]);
        let extractor = PdfTextExtractor;
        let count = extractor.page_count(&pdf_bytes).unwrap();
        let pages = extractor.extract_pages(&pdf_bytes).unwrap();
        assert_eq!(count, pages.len());
    }
}
