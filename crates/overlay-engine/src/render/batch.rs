use std::ops::Range;

use crate::scene::DrawKind;

/// Run of consecutive same-kind commands in paint order.
///
/// `cmds` indexes the commands of that kind only (the n-th rect, the n-th
/// text, ...), which is how each renderer numbers what it prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub kind: DrawKind,
    pub cmds: Range<usize>,
}

/// Groups a paint-ordered sequence of command kinds into maximal batches.
pub fn plan_batches(kinds: impl IntoIterator<Item = DrawKind>, out: &mut Vec<Batch>) {
    out.clear();
    let (mut images, mut rects, mut texts) = (0usize, 0usize, 0usize);

    for kind in kinds {
        let counter = match kind {
            DrawKind::Image => &mut images,
            DrawKind::Rect => &mut rects,
            DrawKind::Text => &mut texts,
        };
        let index = *counter;
        *counter += 1;

        match out.last_mut() {
            Some(last) if last.kind == kind => last.cmds.end = index + 1,
            _ => out.push(Batch {
                kind,
                cmds: index..index + 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DrawKind::*;

    fn plan(kinds: &[DrawKind]) -> Vec<Batch> {
        let mut out = Vec::new();
        plan_batches(kinds.iter().copied(), &mut out);
        out
    }

    #[test]
    fn empty_stream_has_no_batches() {
        assert!(plan(&[]).is_empty());
    }

    #[test]
    fn merges_consecutive_kinds() {
        let b = plan(&[Image, Rect, Rect, Rect, Text]);
        assert_eq!(
            b,
            vec![
                Batch { kind: Image, cmds: 0..1 },
                Batch { kind: Rect, cmds: 0..3 },
                Batch { kind: Text, cmds: 0..1 },
            ]
        );
    }

    #[test]
    fn interleaved_kinds_keep_paint_order() {
        // Label background then text, twice.
        let b = plan(&[Rect, Text, Rect, Text]);
        assert_eq!(
            b,
            vec![
                Batch { kind: Rect, cmds: 0..1 },
                Batch { kind: Text, cmds: 0..1 },
                Batch { kind: Rect, cmds: 1..2 },
                Batch { kind: Text, cmds: 1..2 },
            ]
        );
    }

    #[test]
    fn reuses_output_buffer() {
        let mut out = vec![Batch { kind: Text, cmds: 5..9 }];
        plan_batches([Rect], &mut out);
        assert_eq!(out, vec![Batch { kind: Rect, cmds: 0..1 }]);
    }
}
