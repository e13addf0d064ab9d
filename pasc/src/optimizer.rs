use crate::error::Error;
use casl::{Line, Op, OpKind, Reg};
use std::fs;
use std::path::Path;

use OpKind::*;

/// Runs the three rewrite rules over the program until none of them fires.
pub fn optimize(mut lines: Vec<Line>) -> Vec<Line> {
    loop {
        let mut count = 0;
        count += strip_nops(&mut lines);
        count += fold_push_pop(&mut lines);
        count += strip_identity_lad(&mut lines);
        if count == 0 {
            break;
        }
    }
    lines
}

/// Standalone pass over an existing assembly artifact.
pub fn optimize_file(input: &Path, output: &Path) -> Result<(), Error> {
    let text = fs::read_to_string(input)?;
    let mut lines = Vec::new();
    for (idx, row) in text.lines().enumerate() {
        let line = Line::parse(row).map_err(|_| Error::InvalidAssembly { line: idx + 1 })?;
        lines.push(line);
    }
    let lines = optimize(lines);
    let mut out = String::new();
    for line in &lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    fs::write(output, out)?;
    Ok(())
}

/// Removes unlabeled NOPs; a labeled NOP hands its label to the following
/// instruction when that line has an op and no label of its own.
fn strip_nops(lines: &mut Vec<Line>) -> usize {
    let mut count = 0;
    let mut index = 0;
    while index < lines.len() {
        if lines[index].kind() != Some(NOP) {
            index += 1;
            continue;
        }
        if lines[index].has_label() {
            let mergeable = lines
                .get(index + 1)
                .is_some_and(|next| next.op.is_some() && !next.has_label());
            if mergeable {
                let label = lines.remove(index).label;
                lines[index].label = label;
                count += 1;
            } else {
                index += 1;
            }
        } else {
            lines.remove(index);
            count += 1;
        }
    }
    count
}

/// Folds a PUSH with its matching POP into a single LAD.
///
/// The matching POP is the one that brings the push/pop balance back to
/// zero inside the same basic block; the scan stops at labels and control
/// transfers. `PUSH adr / POP reg` always folds to `LAD reg, adr` at the
/// pop position. `PUSH 0, rs / POP rd` folds only when one of the two
/// registers is untouched in between: an untouched rd moves the LAD up to
/// the push position, an untouched rs leaves it at the pop position.
fn fold_push_pop(lines: &mut Vec<Line>) -> usize {
    let mut count = 0;
    let mut index = 0;
    while index < lines.len() {
        if lines[index].kind() != Some(PUSH) {
            index += 1;
            continue;
        }

        let mut pop_index = None;
        let mut height = 1i32;
        let mut index2 = index + 1;
        while index2 < lines.len() && !lines[index2].is_block_divider() {
            match lines[index2].kind() {
                Some(PUSH) => height += 1,
                Some(POP) => height -= 1,
                _ => {}
            }
            if height == 0 {
                pop_index = Some(index2);
                break;
            }
            index2 += 1;
        }
        let Some(pop_index) = pop_index else {
            index += 1;
            continue;
        };

        let push_operands = lines[index]
            .op
            .as_ref()
            .map(|op| op.operands.clone())
            .unwrap_or_default();
        let pop_target = lines[pop_index].operand(0).unwrap_or("").to_string();

        let mut folded = Vec::with_capacity(push_operands.len() + 1);
        folded.push(pop_target.clone());
        folded.extend(push_operands.iter().cloned());
        let fold = Op {
            kind: LAD,
            operands: folded,
        };

        if push_operands.len() < 2 {
            let label = lines[pop_index].label.take();
            lines[pop_index] = Line {
                label,
                op: Some(fold),
                comment: None,
            };
            let push_label = lines[index].label.take();
            lines.remove(index);
            if let Some(label) = push_label {
                lines.insert(index, Line::labeled(label, NOP, &[]));
                index += 1;
            }
            count += 1;
            continue;
        }

        let push_reg = push_operands.get(1).and_then(|s| Reg::try_parse(s));
        let pop_reg = Reg::try_parse(&pop_target);
        if let (Some(push_reg), Some(pop_reg)) = (push_reg, pop_reg) {
            let mut push_used = false;
            let mut pop_used = false;
            for line in &lines[index + 1..pop_index] {
                if let Some(op) = &line.op {
                    if op.uses_register(push_reg) {
                        push_used = true;
                    }
                    if op.uses_register(pop_reg) {
                        pop_used = true;
                    }
                }
            }

            if !pop_used {
                let pop_label = lines[pop_index].label.take();
                lines.remove(pop_index);
                if let Some(label) = pop_label {
                    lines.insert(pop_index, Line::labeled(label, NOP, &[]));
                }
                let push_label = lines[index].label.take();
                lines.remove(index);
                lines.insert(
                    index,
                    Line {
                        label: push_label,
                        op: Some(fold),
                        comment: None,
                    },
                );
                index += 1;
                count += 1;
                continue;
            } else if !push_used {
                let pop_label = lines[pop_index].label.take();
                lines[pop_index] = Line {
                    label: pop_label,
                    op: Some(fold),
                    comment: None,
                };
                let push_label = lines[index].label.take();
                lines.remove(index);
                if let Some(label) = push_label {
                    lines.insert(index, Line::labeled(label, NOP, &[]));
                    index += 1;
                }
                count += 1;
                continue;
            }
        }
        index += 1;
    }
    count
}

/// `LAD r, 0, r` and `LAD r, #0000, r` restore a register to its own value.
fn strip_identity_lad(lines: &mut Vec<Line>) -> usize {
    let mut count = 0;
    let mut index = 0;
    while index < lines.len() {
        if lines[index].kind() != Some(LAD) {
            index += 1;
            continue;
        }
        let redundant = lines[index].op.as_ref().is_some_and(|op| {
            let dst = op.operand(0).and_then(Reg::try_parse);
            let src = op.operand(2).and_then(Reg::try_parse);
            matches!((dst, src), (Some(a), Some(b)) if a == b)
                && matches!(op.operand(1), Some("0") | Some("#0000"))
        });
        if !redundant {
            index += 1;
            continue;
        }
        let label = lines.remove(index).label;
        if let Some(label) = label {
            lines.insert(index, Line::labeled(label, NOP, &[]));
            index += 1;
        }
        count += 1;
    }
    count
}

// ----------------------------------------------------------------------------
