//! One whitespace-delimited line with typed, position-checked field access

use crate::coord_map::Position;
use crate::error::ParseError;
use crate::interval::{ClusterInterval, SidePair};

pub struct Record<'a> {
    file: &'a str,
    line_no: usize,
    raw: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    pub fn new(file: &'a str, line_no: usize, raw: &'a str) -> Self {
        Record {
            file,
            line_no,
            raw,
            fields: raw.split_whitespace().collect(),
        }
    }

    /// The line exactly as read, without its line terminator
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn fields(&self) -> &[&'a str] {
        &self.fields
    }

    pub fn require(&self, expected: usize) -> Result<(), ParseError> {
        if self.fields.len() < expected {
            return Err(ParseError::MissingFields {
                file: self.file.to_string(),
                line: self.line_no,
                expected,
                found: self.fields.len(),
            });
        }
        Ok(())
    }

    pub fn text(&self, column: usize) -> Result<&'a str, ParseError> {
        self.require(column + 1)?;
        Ok(self.fields[column])
    }

    pub fn int(&self, column: usize) -> Result<i64, ParseError> {
        let value = self.text(column)?;
        value
            .parse()
            .map_err(|_| self.invalid(column, "integer", value))
    }

    pub fn float(&self, column: usize) -> Result<f64, ParseError> {
        let value = self.text(column)?;
        match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(parsed),
            _ => Err(self.invalid(column, "number", value)),
        }
    }

    pub fn interval(&self, column: usize) -> Result<ClusterInterval, ParseError> {
        let value = self.text(column)?;
        ClusterInterval::parse(value).ok_or_else(|| ParseError::InvalidInterval {
            file: self.file.to_string(),
            line: self.line_no,
            column,
            value: value.to_string(),
        })
    }

    /// Integers of a left/right column pair starting at `column`
    pub fn int_pair(&self, column: usize) -> Result<SidePair<i64>, ParseError> {
        Ok(SidePair::new(self.int(column)?, self.int(column + 1)?))
    }

    pub fn float_pair(&self, column: usize) -> Result<SidePair<f64>, ParseError> {
        Ok(SidePair::new(self.float(column)?, self.float(column + 1)?))
    }

    pub fn interval_pair(&self, column: usize) -> Result<SidePair<ClusterInterval>, ParseError> {
        Ok(SidePair::new(self.interval(column)?, self.interval(column + 1)?))
    }

    /// Chromosome and position from columns 0 and 1
    pub fn site_key(&self) -> Result<(&'a str, Position), ParseError> {
        Ok((self.text(0)?, self.int(1)?))
    }

    fn invalid(&self, column: usize, kind: &'static str, value: &str) -> ParseError {
        ParseError::InvalidField {
            file: self.file.to_string(),
            line: self.line_no,
            column,
            kind,
            value: value.to_string(),
        }
    }
}
