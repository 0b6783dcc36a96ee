use crate::bilou::DecodedEntity;
use std::io::Write;

/// Writes the entities of one document, one `<category> <position> <length>` line per entity.
pub fn write_submission<W: Write>(
    writer: &mut W,
    entities: &[DecodedEntity],
) -> std::io::Result<()> {
    for entity in entities {
        writeln!(writer, "{}", entity)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_submission() {
        let entities = vec![
            DecodedEntity::new("PER", 0, 13),
            DecodedEntity::new("LOC", 21, 6),
        ];
        let mut out = Vec::new();
        write_submission(&mut out, &entities).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "PER 0 13\nLOC 21 6\n");
    }

    #[test]
    fn test_write_empty_submission() {
        let mut out = Vec::new();
        write_submission(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
