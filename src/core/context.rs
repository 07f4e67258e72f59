//! Step inputs and outputs.
//!
//! [`StepInput`] is the read-only view a step gets over everything published
//! before it ran. [`OutputSink`] collects what a single execution publishes,
//! together with any errors it ran into.

use crate::core::types::{ByteMap, ColorMap, Grid, Line, Member, MemberKind, Payload};
use std::fmt;

/// Members and errors produced by one step execution.
///
/// Both lists are append-only. A failure later in an execution never
/// removes members added before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSink {
    members: Vec<Member>,
    errors: Vec<String>,
}

impl OutputSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member.
    pub fn add_member(&mut self, member: Member) {
        log::debug!("Publishing {}", member);
        self.members.push(member);
    }

    /// Append a member built from a published name and a payload.
    pub fn publish(&mut self, name: impl Into<String>, payload: Payload) {
        self.add_member(Member::new(name, payload));
    }

    /// Append an error message.
    pub fn add_error(&mut self, error: impl fmt::Display) {
        let message = error.to_string();
        log::warn!("{}", message);
        self.errors.push(message);
    }

    /// All members in publication order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// All errors in the order they were reported.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Members published under `name`. Several members may share a name.
    pub fn members_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Member> + 'a {
        self.members.iter().filter(move |m| m.name == name)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True when nothing was published and nothing went wrong.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.errors.is_empty()
    }
}

/// Read-only view over the outputs of earlier steps.
///
/// Steps are handed the sinks of every step that ran before them, oldest
/// first. Lookups never fail; a miss is simply `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepInput<'a> {
    previous_steps: &'a [OutputSink],
}

impl<'a> StepInput<'a> {
    /// Create a view over the outputs of earlier steps, oldest first.
    pub fn new(previous_steps: &'a [OutputSink]) -> Self {
        Self { previous_steps }
    }

    /// Outputs of every earlier step, oldest first.
    pub fn previous_steps(&self) -> &'a [OutputSink] {
        self.previous_steps
    }

    /// Output of the step that ran immediately before, if any.
    pub fn previous_step(&self) -> Option<&'a OutputSink> {
        self.previous_steps.last()
    }

    /// Find a member by published name.
    ///
    /// The most recent step wins; within a step the first member published
    /// under the name wins.
    pub fn member(&self, name: &str) -> Option<&'a Member> {
        self.find(name, |_| true)
    }

    /// Find a member by published name that carries a payload of `kind`.
    pub fn member_of_kind(&self, name: &str, kind: MemberKind) -> Option<&'a Member> {
        self.find(name, |m| m.kind() == kind)
    }

    pub fn color_map(&self, name: &str) -> Option<&'a ColorMap> {
        self.member_of_kind(name, MemberKind::ColorMap)
            .and_then(Member::as_color_map)
    }

    pub fn byte_map(&self, name: &str) -> Option<&'a ByteMap> {
        self.member_of_kind(name, MemberKind::ByteMap)
            .and_then(Member::as_byte_map)
    }

    pub fn line_collection(&self, name: &str) -> Option<&'a [Line]> {
        self.member_of_kind(name, MemberKind::LineCollection)
            .and_then(Member::as_line_collection)
    }

    pub fn grid(&self, name: &str) -> Option<&'a Grid> {
        self.member_of_kind(name, MemberKind::Grid)
            .and_then(Member::as_grid)
    }

    fn find(&self, name: &str, accept: impl Fn(&Member) -> bool) -> Option<&'a Member> {
        if name.is_empty() {
            return None;
        }
        self.previous_steps
            .iter()
            .rev()
            .find_map(|step| step.members().iter().find(|m| m.name == name && accept(*m)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Floats, Point};

    fn sink_with(members: Vec<Member>) -> OutputSink {
        let mut sink = OutputSink::new();
        for member in members {
            sink.add_member(member);
        }
        sink
    }

    #[test]
    fn test_sink_keeps_members_after_errors() {
        let mut sink = OutputSink::new();
        sink.publish("a", Payload::ColorMap(ColorMap::new(1, 1)));
        sink.add_error("something broke");

        assert_eq!(sink.members().len(), 1);
        assert_eq!(sink.errors(), ["something broke".to_string()]);
        assert!(sink.has_errors());
    }

    #[test]
    fn test_sink_allows_shared_names() {
        let sink = sink_with(vec![
            Member::new("out", Payload::Floats(Floats::default())),
            Member::new("out", Payload::Floats(Floats::default())),
        ]);
        assert_eq!(sink.members_named("out").count(), 2);
    }

    #[test]
    fn test_lookup_prefers_latest_step() {
        let steps = vec![
            sink_with(vec![Member::new("img", Payload::ColorMap(ColorMap::new(1, 1)))]),
            sink_with(vec![Member::new("img", Payload::ColorMap(ColorMap::new(2, 2)))]),
        ];
        let input = StepInput::new(&steps);

        let found = input.color_map("img").unwrap();
        assert_eq!(found.dimensions(), (2, 2));
    }

    #[test]
    fn test_lookup_misses_are_none() {
        let steps = vec![sink_with(vec![Member::new(
            "grid",
            Payload::Grid(Grid {
                origin: Point::default(),
                x_axis: Point::new(1.0, 0.0),
                y_axis: Point::new(0.0, 1.0),
                x_cells: 1,
                y_cells: 1,
            }),
        )])];
        let input = StepInput::new(&steps);

        assert!(input.member("nope").is_none());
        assert!(input.member("").is_none());
        // Wrong payload kind is a miss, not an error
        assert!(input.color_map("grid").is_none());
        assert!(input.grid("grid").is_some());
    }

    #[test]
    fn test_previous_step() {
        let empty = StepInput::default();
        assert!(empty.previous_step().is_none());

        let steps = vec![OutputSink::new(), sink_with(vec![])];
        let input = StepInput::new(&steps);
        assert_eq!(input.previous_steps().len(), 2);
        assert!(input.previous_step().is_some());
    }
}
