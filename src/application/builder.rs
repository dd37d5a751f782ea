//! # Scenario Builder
//!
//! Walks the loose `states` tree of a scenario file into a [`Definition`] and
//! one [`State`] per place:
//!
//! ```yaml
//! states:
//!   - name: menu
//!     actions:
//!       - name: send_menu
//!         params: { text: "Pick one" }
//!     transitions:
//!       - name: to_buy
//!         state_to: buy
//!         command: { type: button, arguments: [buy, "Buy"] }
//! ```
//!
//! Places are registered before any transition, so edges may point forward.

use std::collections::HashMap;
use std::sync::Arc;

use serde_yaml::Value;

use crate::application::error::BuildError;
use crate::application::maintenance::MaintenanceGate;
use crate::application::registry::{ActionParams, Registry};
use crate::application::scenario::{Scenario, menu_error_handler};
use crate::application::state::State;
use crate::domain::config::{AppConfig, ScenarioConfig};
use crate::domain::petrinet::{Definition, Transition};

struct ActionDecl {
    name: String,
    params: ActionParams,
    path: String,
}

struct EdgeDecl {
    name: String,
    state_to: String,
    kind: String,
    arguments: Vec<String>,
    path: String,
}

struct PlaceDecl {
    name: String,
    actions: Vec<ActionDecl>,
    edges: Vec<EdgeDecl>,
}

pub struct ScenarioBuilder<'r> {
    registry: &'r Registry,
    initial: Option<Vec<String>>,
}

impl<'r> ScenarioBuilder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            initial: None,
        }
    }

    /// Overrides the default initial place (the first declared one).
    pub fn initial(mut self, places: Option<Vec<String>>) -> Self {
        self.initial = places;
        self
    }

    pub fn build(&self, states: &Value) -> Result<(Definition, Vec<State>), BuildError> {
        let places = parse_places(states)?;

        let mut definition = Definition::default();
        let mut seen = HashMap::new();
        for (i, place) in places.iter().enumerate() {
            if seen.insert(place.name.as_str(), i).is_some() {
                return Err(BuildError::malformed(
                    &format!("states[{i}].name"),
                    format!("duplicate state `{}`", place.name),
                ));
            }
            definition.add_place(place.name.clone());
        }
        if let Some(initial) = &self.initial {
            definition.set_initial_places(initial.iter().cloned())?;
        }

        let mut shared: HashMap<(String, String, String), Arc<Transition>> = HashMap::new();
        let mut targets: HashMap<(String, String), String> = HashMap::new();
        let mut states = Vec::with_capacity(places.len());

        for place in places {
            let mut state = State::new(place.name.clone());

            for decl in &place.actions {
                let action = self
                    .registry
                    .create_action(&decl.name, &decl.params)
                    .map_err(|reason| BuildError::malformed(&decl.path, reason))?
                    .ok_or_else(|| BuildError::UnknownAction {
                        name: decl.name.clone(),
                        state: place.name.clone(),
                    })?;
                state.actions.push(action);
            }

            for edge in place.edges {
                // Both arc-sets would consume the same place on one fire.
                let previous = targets
                    .entry((place.name.clone(), edge.name.clone()))
                    .or_insert_with(|| edge.state_to.clone());
                if *previous != edge.state_to {
                    return Err(BuildError::AmbiguousTransition {
                        state: place.name.clone(),
                        transition: edge.name.clone(),
                        first: previous.clone(),
                        second: edge.state_to.clone(),
                    });
                }

                let command = self
                    .registry
                    .create_command(&edge.kind, &place.name, &edge.arguments)
                    .map_err(|reason| BuildError::malformed(&edge.path, reason))?
                    .ok_or_else(|| BuildError::UnknownCommand {
                        kind: edge.kind.clone(),
                        state: place.name.clone(),
                    })?;

                let key = (place.name.clone(), edge.name.clone(), edge.state_to.clone());
                let transition = match shared.get(&key) {
                    Some(existing) => existing.clone(),
                    None => {
                        let transition = Arc::new(Transition::new(
                            edge.name.clone(),
                            [place.name.clone()],
                            [edge.state_to.clone()],
                        ));
                        definition.add_transition(transition.clone())?;
                        shared.insert(key, transition.clone());
                        transition
                    }
                };
                state.transitions.add(command, transition);
            }

            states.push(state);
        }

        tracing::debug!(
            places = definition.places().len(),
            transitions = definition.transitions().len(),
            "built scenario definition"
        );
        Ok((definition, states))
    }
}

/// Builds a ready-to-dispatch [`Scenario`] from its file and the application
/// settings.
pub fn build_scenario(config: &ScenarioConfig, app: &AppConfig, registry: &Registry) -> Result<Scenario, BuildError> {
    let section = &config.scenario;
    let (definition, states) = ScenarioBuilder::new(registry)
        .initial(section.initial.clone())
        .build(&section.states)?;

    let initial: Vec<String> = definition.initial_places().iter().cloned().collect();
    Ok(Scenario::new(section.name.clone(), definition, section.marking, states)
        .with_error_handler(menu_error_handler(initial))
        .with_gate(MaintenanceGate::from_settings(&app.settings))
        .with_max_instant_chain(app.system.max_instant_chain))
}

fn parse_places(states: &Value) -> Result<Vec<PlaceDecl>, BuildError> {
    let nodes = states
        .as_sequence()
        .ok_or_else(|| BuildError::malformed("states", "expected a list of states"))?;

    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| parse_place(node, &format!("states[{i}]")))
        .collect()
}

fn parse_place(node: &Value, path: &str) -> Result<PlaceDecl, BuildError> {
    if !node.is_mapping() {
        return Err(BuildError::malformed(path, "expected a mapping"));
    }
    let name = required_str(node, "name", path)?;

    let actions = list(node, "actions", path)?
        .iter()
        .enumerate()
        .map(|(j, action)| -> Result<ActionDecl, BuildError> {
            let path = format!("{path}.actions[{j}]");
            Ok(ActionDecl {
                name: required_str(action, "name", &path)?,
                params: params(action.get("params"), &path)?,
                path,
            })
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    let edges = list(node, "transitions", path)?
        .iter()
        .enumerate()
        .map(|(j, edge)| -> Result<EdgeDecl, BuildError> {
            let path = format!("{path}.transitions[{j}]");
            let command_path = format!("{path}.command");
            let command = edge
                .get("command")
                .filter(|c| c.is_mapping())
                .ok_or_else(|| BuildError::malformed(&command_path, "expected a mapping"))?;
            Ok(EdgeDecl {
                name: required_str(edge, "name", &path)?,
                state_to: required_str(edge, "state_to", &path)?,
                kind: required_str(command, "type", &command_path)?,
                arguments: arguments(command.get("arguments"), &command_path)?,
                path,
            })
        })
        .collect::<Result<Vec<_>, BuildError>>()?;

    Ok(PlaceDecl { name, actions, edges })
}

fn list<'v>(node: &'v Value, key: &str, path: &str) -> Result<&'v [Value], BuildError> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Sequence(items)) => Ok(items.as_slice()),
        Some(_) => Err(BuildError::malformed(&format!("{path}.{key}"), "expected a list")),
    }
}

fn required_str(node: &Value, key: &str, path: &str) -> Result<String, BuildError> {
    node.get(key)
        .and_then(scalar)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BuildError::malformed(&format!("{path}.{key}"), "expected a non-empty scalar"))
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn params(value: Option<&Value>, path: &str) -> Result<ActionParams, BuildError> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(ActionParams::new());
    };
    let mapping = value
        .as_mapping()
        .ok_or_else(|| BuildError::malformed(&format!("{path}.params"), "expected a mapping"))?;

    mapping
        .iter()
        .map(|(k, v)| -> Result<(String, String), BuildError> {
            let key = scalar(k).ok_or_else(|| BuildError::malformed(&format!("{path}.params"), "expected scalar keys"))?;
            let value = scalar(v)
                .ok_or_else(|| BuildError::malformed(&format!("{path}.params.{key}"), "expected a scalar"))?;
            Ok((key, value))
        })
        .collect()
}

fn arguments(value: Option<&Value>, path: &str) -> Result<Vec<String>, BuildError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(k, item)| {
                scalar(item).ok_or_else(|| BuildError::malformed(&format!("{path}.arguments[{k}]"), "expected a scalar"))
            })
            .collect(),
        Some(single) => scalar(single)
            .map(|s| vec![s])
            .ok_or_else(|| BuildError::malformed(&format!("{path}.arguments"), "expected a list of scalars")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::scenario::DispatchOutcome;
    use crate::application::testing::RecordingProvider;
    use crate::domain::petrinet::{DefinitionError, MarkingField};
    use crate::domain::types::InboundEvent;

    const SHOP: &str = r#"
- name: start
  actions:
    - name: send_text
      params: { text: "Welcome {{ first_name }}" }
  transitions:
    - name: to_menu
      state_to: menu
      command: { type: text_input }
- name: menu
  actions:
    - name: send_menu
      params: { text: "Menu" }
  transitions:
    - name: to_amount
      state_to: amount
      command: { type: button, arguments: [buy, "Buy"] }
    - name: to_amount
      state_to: amount
      command: { type: recognize_input, arguments: [buy] }
    - name: to_menu_again
      state_to: menu
      command: { type: text_input }
- name: amount
  actions:
    - name: send_text
      params:
        text: "How much?"
  transitions:
    - name: amount_ok
      state_to: done
      command: { type: recognize_input, arguments: [number, '^\d+$'] }
- name: done
  actions:
    - name: store_input
      params: { key: amount }
  transitions:
    - name: finish
      state_to: menu
      command: { type: instant }
"#;
    fn tree(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn build(yaml: &str) -> Result<(Definition, Vec<State>), BuildError> {
        ScenarioBuilder::new(&Registry::new()).build(&tree(yaml))
    }

    #[test]
    fn test_builds_places_and_shared_transitions() {
        let (definition, states) = build(SHOP).unwrap();

        assert_eq!(definition.places().len(), 4);
        assert_eq!(definition.initial_places().iter().collect::<Vec<_>>(), vec!["start"]);
        assert_eq!(definition.transitions().len(), 5);

        let menu = &states[1];
        assert_eq!(menu.transitions.len(), 3);
        let entries = menu.transitions.entries();
        assert!(Arc::ptr_eq(&entries[0].transition, &entries[1].transition));
    }

    #[test]
    fn test_end_to_end_dispatch() {
        let config = ScenarioConfig::parse(&format!(
            "scenario:\n  name: shop\n  states:\n{}",
            SHOP.lines().map(|l| format!("    {l}\n")).collect::<String>()
        ))
        .unwrap();
        let scenario = build_scenario(&config, &AppConfig::default(), &Registry::new()).unwrap();
        let provider = RecordingProvider::new("1");
        let mut token = scenario.new_token("1");

        scenario
            .handle_event(&provider, &mut token, &InboundEvent::Text("hi".into()))
            .unwrap();
        assert_eq!(token.state, MarkingField::Single("menu".into()));

        let outcome = scenario
            .handle_event(&provider, &mut token, &InboundEvent::Text("BUY".into()))
            .unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Fired {
                transition: "to_amount".into(),
                state: "amount".into(),
                chained: 0
            }
        );

        scenario
            .handle_event(&provider, &mut token, &InboundEvent::Text("abc".into()))
            .unwrap();
        assert_eq!(token.state, MarkingField::Single("amount".into()));

        let outcome = scenario
            .handle_event(&provider, &mut token, &InboundEvent::Text("250".into()))
            .unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Fired {
                transition: "finish".into(),
                state: "menu".into(),
                chained: 1
            }
        );
        assert_eq!(token.extra("amount"), Some("250"));
        assert!(provider.texts().contains(&"How much?".to_string()));
        assert_eq!(provider.texts().last().map(String::as_str), Some("Menu"));
    }

    #[test]
    fn test_unknown_target_place_is_rejected() {
        let err = build(
            r#"
- name: a
  transitions:
    - { name: t, state_to: nowhere, command: { type: button, arguments: [go] } }
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Definition(DefinitionError::NonExistentPlace { ref place, .. }) if place == "nowhere"
        ));
    }

    #[test]
    fn test_unknown_action_and_command() {
        let err = build("- { name: a, actions: [{ name: teleport }] }").unwrap_err();
        assert!(matches!(err, BuildError::UnknownAction { ref name, .. } if name == "teleport"));

        let err = build(
            r#"
- name: a
  transitions:
    - { name: t, state_to: a, command: { type: validate_wallet } }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::UnknownCommand { ref kind, .. } if kind == "validate_wallet"));
    }

    #[test]
    fn test_malformed_nodes_carry_path() {
        let err = build("states: not-a-list").unwrap_err();
        assert!(matches!(err, BuildError::Malformed { ref path, .. } if path == "states"));

        let err = build("- { name: a, transitions: [{ name: t, command: { type: instant } }] }").unwrap_err();
        assert!(matches!(err, BuildError::Malformed { ref path, .. } if path == "states[0].transitions[0].state_to"));

        let err = build("- { name: a, actions: [{ name: send_text }] }").unwrap_err();
        assert!(matches!(err, BuildError::Malformed { ref path, .. } if path == "states[0].actions[0]"));

        let err = build("- { name: a }\n- { name: a }").unwrap_err();
        assert!(matches!(err, BuildError::Malformed { ref path, .. } if path == "states[1].name"));
    }

    #[test]
    fn test_ambiguous_transition_is_rejected() {
        let yaml = r#"
- name: a
  transitions:
    - { name: t, state_to: b, command: { type: button, arguments: [x] } }
    - { name: t, state_to: c, command: { type: button, arguments: [y] } }
- name: b
- name: c
"#;
        let err = build(yaml).unwrap_err();
        assert!(matches!(err, BuildError::AmbiguousTransition { ref transition, .. } if transition == "t"));

        assert!(matches!(
            err,
            BuildError::AmbiguousTransition { ref first, ref second, .. } if first == "b" && second == "c"
        ));
    }

    #[test]
    fn test_shared_name_across_places_builds() {
        let yaml = r#"
- name: a
  transitions:
    - { name: t, state_to: c, command: { type: button, arguments: [x] } }
- name: b
  transitions:
    - { name: t, state_to: d, command: { type: button, arguments: [x] } }
- name: c
- name: d
"#;
        let (definition, _) = build(yaml).unwrap();
        assert_eq!(definition.transitions_named("t").count(), 2);
    }

    #[test]
    fn test_initial_override() {
        let yaml = "- { name: a }\n- { name: b }";
        let (definition, _) = ScenarioBuilder::new(&Registry::new())
            .initial(Some(vec!["b".into()]))
            .build(&tree(yaml))
            .unwrap();
        assert_eq!(definition.initial_places().iter().collect::<Vec<_>>(), vec!["b"]);

        let err = ScenarioBuilder::new(&Registry::new())
            .initial(Some(vec!["zzz".into()]))
            .build(&tree(yaml))
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Definition(DefinitionError::NonExistentInitialPlace { .. })
        ));
    }
}
