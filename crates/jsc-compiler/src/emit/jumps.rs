//! Jump management for control flow (source spec §3 "Loop Context").
//!
//! Tracks a stack of breakable contexts — loops, switches, and labeled plain
//! statements — so `break`/`continue` (bare or labeled) can find the right
//! target, collect pending jumps to patch once the construct's end is known,
//! and, for loops, know what per-iteration cleanup (closing an upvalue,
//! returning an abandoned iterator) needs to run before control actually
//! leaves.

use crate::register::Register;

use super::JumpLabel;

/// Manages jump targets for control flow.
#[derive(Debug, Default)]
pub struct JumpManager {
    /// Stack of breakable contexts, innermost last.
    contexts: Vec<BreakableContext>,
}

/// The kind of breakable context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakableKind {
    /// `while`/`for`/`do-while`/`for-of`/`for-in` — supports break and
    /// continue.
    Loop,
    /// `switch` — supports break only.
    Switch,
    /// A labeled non-loop, non-switch statement (`label: { ... }`) —
    /// supports break by that label only, never continue and never a bare
    /// (unlabeled) break.
    Block,
}

/// Per-iteration loop cleanup to run when control leaves a loop early
/// (source spec §3 Loop Context: "optional iterator-cleanup descriptor").
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopCleanup {
    /// Register holding a `for-of`/destructuring iterator that must be
    /// closed (`TypeGuardIteratorReturn`) if abandoned before exhaustion.
    pub iterator_reg: Option<Register>,
    /// The per-iteration binding register a `for`/`for-of` with `let`/
    /// `const` closes (`CloseUpvalue`) so a closure created during this
    /// iteration keeps observing its own snapshot.
    pub binding_reg: Option<Register>,
}

/// Context for a breakable construct.
#[derive(Debug)]
struct BreakableContext {
    kind: BreakableKind,
    /// Target offset for continue statements; only ever set for `Loop`.
    continue_target: Option<usize>,
    break_labels: Vec<JumpLabel>,
    /// The statement label this context was entered under, if any
    /// (`label: while (...) {}` or `label: { ... }`).
    label: Option<String>,
    cleanup: LoopCleanup,
    /// Register holding this loop's completion value (ECMAScript "V"),
    /// updated after each iteration's body so an abrupt exit can still
    /// produce the loop's completion value (source spec §3 Loop Context).
    completion_reg: Option<Register>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BreakError {
    #[error("break/continue used outside any loop or switch")]
    NotInBreakable,
    #[error("continue used outside a loop")]
    NotInLoop,
    #[error("no enclosing statement labeled `{0}`")]
    UnknownLabel(String),
}

impl JumpManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_loop(&mut self, continue_target: usize, label: Option<String>) {
        self.contexts.push(BreakableContext {
            kind: BreakableKind::Loop,
            continue_target: Some(continue_target),
            break_labels: Vec::new(),
            label,
            cleanup: LoopCleanup::default(),
            completion_reg: None,
        });
    }

    pub fn enter_switch(&mut self, label: Option<String>) {
        self.contexts.push(BreakableContext {
            kind: BreakableKind::Switch,
            continue_target: None,
            break_labels: Vec::new(),
            label,
            cleanup: LoopCleanup::default(),
            completion_reg: None,
        });
    }

    /// Enter a plain labeled statement that is neither a loop nor a switch
    /// (`label: { ... }`, `label: if (...) {}`). Only a labeled break can
    /// target it.
    pub fn enter_labeled_block(&mut self, label: String) {
        self.contexts.push(BreakableContext {
            kind: BreakableKind::Block,
            continue_target: None,
            break_labels: Vec::new(),
            label: Some(label),
            cleanup: LoopCleanup::default(),
            completion_reg: None,
        });
    }

    /// Exit the current breakable context, returning its pending break jumps
    /// to patch to just past the construct.
    pub fn exit_breakable(&mut self) -> Vec<JumpLabel> {
        self.contexts.pop().map(|ctx| ctx.break_labels).unwrap_or_default()
    }

    pub fn exit_loop(&mut self) -> Vec<JumpLabel> {
        self.exit_breakable()
    }

    pub fn exit_switch(&mut self) -> Vec<JumpLabel> {
        self.exit_breakable()
    }

    pub fn in_loop(&self) -> bool {
        self.contexts.iter().any(|ctx| ctx.kind == BreakableKind::Loop)
    }

    pub fn in_switch(&self) -> bool {
        self.contexts.iter().any(|ctx| ctx.kind == BreakableKind::Switch)
    }

    pub fn in_breakable(&self) -> bool {
        self.contexts.iter().any(|ctx| ctx.kind != BreakableKind::Block)
    }

    /// Record a pending break jump. With no label, targets the innermost
    /// loop or switch. With a label, targets whichever enclosing context
    /// (of any kind) carries that label.
    pub fn add_break(&mut self, label: Option<&str>, jump: JumpLabel) -> Result<(), BreakError> {
        match label {
            None => {
                for ctx in self.contexts.iter_mut().rev() {
                    if ctx.kind != BreakableKind::Block {
                        ctx.break_labels.push(jump);
                        return Ok(());
                    }
                }
                Err(BreakError::NotInBreakable)
            }
            Some(name) => {
                for ctx in self.contexts.iter_mut().rev() {
                    if ctx.label.as_deref() == Some(name) {
                        ctx.break_labels.push(jump);
                        return Ok(());
                    }
                }
                Err(BreakError::UnknownLabel(name.to_string()))
            }
        }
    }

    /// Resolve the continue target for the innermost loop (bare continue)
    /// or a specifically labeled loop.
    pub fn continue_target(&self, label: Option<&str>) -> Result<usize, BreakError> {
        match label {
            None => {
                for ctx in self.contexts.iter().rev() {
                    if ctx.kind == BreakableKind::Loop {
                        return ctx.continue_target.ok_or(BreakError::NotInLoop);
                    }
                }
                Err(BreakError::NotInLoop)
            }
            Some(name) => {
                for ctx in self.contexts.iter().rev() {
                    if ctx.label.as_deref() == Some(name) {
                        return ctx.continue_target.ok_or(BreakError::NotInLoop);
                    }
                }
                Err(BreakError::UnknownLabel(name.to_string()))
            }
        }
    }

    /// Update the continue target for the innermost loop — used by `for`
    /// once the update-clause position is known.
    pub fn set_continue_target(&mut self, target: usize) {
        for ctx in self.contexts.iter_mut().rev() {
            if ctx.kind == BreakableKind::Loop {
                ctx.continue_target = Some(target);
                return;
            }
        }
    }

    /// Attach iterator/binding cleanup to the innermost loop.
    pub fn set_loop_cleanup(&mut self, cleanup: LoopCleanup) {
        if let Some(ctx) = self.contexts.iter_mut().rev().find(|c| c.kind == BreakableKind::Loop) {
            ctx.cleanup = cleanup;
        }
    }

    pub fn set_completion_reg(&mut self, reg: Register) {
        if let Some(ctx) = self.contexts.iter_mut().rev().find(|c| c.kind == BreakableKind::Loop) {
            ctx.completion_reg = Some(reg);
        }
    }

    pub fn completion_reg(&self) -> Option<Register> {
        self.contexts.iter().rev().find(|c| c.kind == BreakableKind::Loop).and_then(|c| c.completion_reg)
    }

    /// Cleanup descriptors for every loop an unlabeled/labeled `break` would
    /// cross, innermost first, up to and including the target loop itself
    /// (leaving that loop also needs its own cleanup run).
    pub fn cleanups_for_break(&self, label: Option<&str>) -> Result<Vec<LoopCleanup>, BreakError> {
        let target_idx = self.target_index(label, true)?;
        Ok(self.contexts[target_idx..]
            .iter()
            .rev()
            .filter(|c| c.kind == BreakableKind::Loop)
            .map(|c| c.cleanup)
            .collect())
    }

    /// Cleanup descriptors for every loop a `continue` would cross,
    /// innermost first, *excluding* the target loop (control resumes inside
    /// it, so its own per-iteration state isn't being abandoned).
    pub fn cleanups_for_continue(&self, label: Option<&str>) -> Result<Vec<LoopCleanup>, BreakError> {
        let target_idx = self.target_index(label, false)?;
        Ok(self.contexts[target_idx + 1..]
            .iter()
            .rev()
            .filter(|c| c.kind == BreakableKind::Loop)
            .map(|c| c.cleanup)
            .collect())
    }

    fn target_index(&self, label: Option<&str>, allow_non_loop: bool) -> Result<usize, BreakError> {
        match label {
            None => self
                .contexts
                .iter()
                .rposition(|c| c.kind != BreakableKind::Block)
                .ok_or(BreakError::NotInBreakable),
            Some(name) => {
                let idx = self
                    .contexts
                    .iter()
                    .rposition(|c| c.label.as_deref() == Some(name))
                    .ok_or_else(|| BreakError::UnknownLabel(name.to_string()))?;
                if !allow_non_loop && self.contexts[idx].kind != BreakableKind::Loop {
                    return Err(BreakError::NotInLoop);
                }
                Ok(idx)
            }
        }
    }

    pub fn loop_depth(&self) -> usize {
        self.contexts.iter().filter(|ctx| ctx.kind == BreakableKind::Loop).count()
    }

    pub fn breakable_depth(&self) -> usize {
        self.contexts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_not_in_loop() {
        let manager = JumpManager::new();
        assert!(!manager.in_loop());
        assert!(!manager.in_switch());
        assert!(!manager.in_breakable());
        assert_eq!(manager.loop_depth(), 0);
    }

    #[test]
    fn enter_loop_tracks_continue_target() {
        let mut manager = JumpManager::new();
        manager.enter_loop(10, None);
        assert!(manager.in_loop());
        assert_eq!(manager.continue_target(None), Ok(10));
    }

    #[test]
    fn enter_switch_rejects_continue() {
        let mut manager = JumpManager::new();
        manager.enter_switch(None);
        assert!(manager.in_switch());
        assert!(manager.continue_target(None).is_err());
    }

    #[test]
    fn nested_loops_continue_targets_innermost() {
        let mut manager = JumpManager::new();
        manager.enter_loop(10, None);
        manager.enter_loop(20, None);
        assert_eq!(manager.continue_target(None), Ok(20));
        manager.exit_loop();
        assert_eq!(manager.continue_target(None), Ok(10));
    }

    #[test]
    fn switch_inside_loop_continue_finds_loop() {
        let mut manager = JumpManager::new();
        manager.enter_loop(10, None);
        manager.enter_switch(None);
        assert_eq!(manager.continue_target(None), Ok(10));
    }

    #[test]
    fn labeled_break_finds_outer_labeled_loop() {
        let mut manager = JumpManager::new();
        manager.enter_loop(10, Some("outer".to_string()));
        manager.enter_loop(20, None);
        manager.add_break(Some("outer"), JumpLabel(999)).unwrap();
        let inner_breaks = manager.exit_loop();
        assert!(inner_breaks.is_empty());
        let outer_breaks = manager.exit_loop();
        assert_eq!(outer_breaks, vec![JumpLabel(999)]);
    }

    #[test]
    fn unknown_label_errors() {
        let mut manager = JumpManager::new();
        manager.enter_loop(10, None);
        assert_eq!(manager.add_break(Some("missing"), JumpLabel(1)), Err(BreakError::UnknownLabel("missing")));
    }

    #[test]
    fn labeled_block_supports_break_not_continue() {
        let mut manager = JumpManager::new();
        manager.enter_labeled_block("outer".to_string());
        manager.add_break(Some("outer"), JumpLabel(1)).unwrap();
        assert_eq!(manager.continue_target(Some("outer")), Err(BreakError::NotInLoop));
    }

    #[test]
    fn bare_break_skips_labeled_blocks() {
        let mut manager = JumpManager::new();
        manager.enter_labeled_block("outer".to_string());
        assert!(manager.add_break(None, JumpLabel(1)).is_err());
    }

    #[test]
    fn cleanups_for_break_collects_crossed_loops() {
        let mut manager = JumpManager::new();
        manager.enter_loop(0, Some("outer".to_string()));
        manager.set_loop_cleanup(LoopCleanup { iterator_reg: Some(3), binding_reg: None });
        manager.enter_loop(0, None);
        manager.set_loop_cleanup(LoopCleanup { iterator_reg: Some(7), binding_reg: None });

        let cleanups = manager.cleanups_for_break(Some("outer")).unwrap();
        assert_eq!(cleanups.len(), 2);
        assert_eq!(cleanups[0].iterator_reg, Some(7));
        assert_eq!(cleanups[1].iterator_reg, Some(3));
    }

    #[test]
    fn cleanups_for_continue_excludes_target_loop() {
        let mut manager = JumpManager::new();
        manager.enter_loop(0, Some("outer".to_string()));
        manager.set_loop_cleanup(LoopCleanup { iterator_reg: Some(3), binding_reg: None });
        manager.enter_loop(0, None);
        manager.set_loop_cleanup(LoopCleanup { iterator_reg: Some(7), binding_reg: None });

        let cleanups = manager.cleanups_for_continue(Some("outer")).unwrap();
        assert_eq!(cleanups.len(), 1);
        assert_eq!(cleanups[0].iterator_reg, Some(7));
    }

    #[test]
    fn set_continue_target_for_for_loop_update_clause() {
        let mut manager = JumpManager::new();
        manager.enter_loop(10, None);
        manager.set_continue_target(50);
        assert_eq!(manager.continue_target(None), Ok(50));
    }

    #[test]
    fn completion_reg_round_trips() {
        let mut manager = JumpManager::new();
        manager.enter_loop(0, None);
        manager.set_completion_reg(5);
        assert_eq!(manager.completion_reg(), Some(5));
    }
}
