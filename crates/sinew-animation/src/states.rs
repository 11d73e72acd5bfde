//! Animation state graph: named states owning blend tree templates, linked
//! by named transitions.
//!
//! The graph is built once from a `StateGraphDef` (usually read from a
//! `.graph.toml` file) and then shared read-only by every layer using it.

use crate::animation::Animation;
use crate::blend_tree::{BlendFactor, BlendNode, BlendTree};
use crate::layer::CrossFadeCurve;
use crate::library::ClipLibrary;
use serde::Deserialize;
use sinew_core::{Result, SinewError};
use std::ops::Range;

/// Authored state graph, the input to `StateGraph::build`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateGraphDef {
    #[serde(default)]
    pub states: Vec<StateDef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateDef {
    pub name: String,
    /// Blend tree root; a state without one cannot be played
    #[serde(default)]
    pub tree: Option<NodeDef>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

/// Authored blend tree node
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDef {
    Clip {
        clip: String,
        #[serde(default = "default_looped")]
        looped: bool,
        #[serde(default = "default_rate")]
        rate: f32,
    },
    Lerp {
        #[serde(default, rename = "factor-name")]
        factor_name: Option<String>,
        #[serde(default, rename = "factor-value")]
        factor_value: f32,
        left: Box<NodeDef>,
        right: Box<NodeDef>,
    },
    Additive {
        #[serde(default, rename = "factor-name")]
        factor_name: Option<String>,
        #[serde(default, rename = "factor-value")]
        factor_value: f32,
        left: Box<NodeDef>,
        right: Box<NodeDef>,
    },
}

fn default_looped() -> bool {
    true
}

fn default_rate() -> f32 {
    1.0
}

impl NodeDef {
    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        match self {
            NodeDef::Clip { .. } => 1,
            NodeDef::Lerp { left, right, .. } | NodeDef::Additive { left, right, .. } => {
                1 + left.node_count() + right.node_count()
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionDef {
    pub name: String,
    /// Name of the destination state
    pub target: String,
    /// Cross-fade duration in milliseconds
    #[serde(default, rename = "fade-time")]
    pub fade_time: f32,
    #[serde(default)]
    pub sync: bool,
    #[serde(default)]
    pub curve: CrossFadeCurve,
}

/// A named edge out of a state
#[derive(Debug, Clone)]
pub struct Transition {
    name: String,
    /// Index of the destination state in the owning graph
    destination: usize,
    blend_time_ms: f32,
    sync: bool,
    curve: CrossFadeCurve,
}

impl Transition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn destination(&self) -> usize {
        self.destination
    }

    pub fn blend_time(&self) -> f32 {
        self.blend_time_ms
    }

    /// Synced transitions start the destination in phase with the current tree
    pub fn is_synced(&self) -> bool {
        self.sync
    }

    pub fn curve(&self) -> CrossFadeCurve {
        self.curve
    }
}

#[derive(Debug, Clone)]
pub struct State {
    name: String,
    tree: BlendTree,
    /// This state's slice of the graph's transition array
    transitions: Range<usize>,
}

impl State {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template tree copied into a layer when the state is entered
    pub fn blend_tree(&self) -> &BlendTree {
        &self.tree
    }
}

/// States and their transitions, with every transition target resolved
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    states: Vec<State>,
    /// All transitions, grouped by owning state
    transitions: Vec<Transition>,
}

impl StateGraph {
    /// Build the graph, resolving clip names through `clips`.
    ///
    /// Fails if a clip is missing or a transition targets an unknown state.
    pub fn build(def: &StateGraphDef, clips: &ClipLibrary) -> Result<Self> {
        // states first, so transition targets can be looked up afterwards
        let mut states = Vec::with_capacity(def.states.len());
        for state_def in &def.states {
            let tree = match &state_def.tree {
                Some(root) => build_tree(root, clips)?,
                None => {
                    log::warn!("State '{}' has no blend tree", state_def.name);
                    BlendTree::new()
                }
            };
            states.push(State {
                name: state_def.name.clone(),
                tree,
                transitions: 0..0,
            });
        }

        let mut graph = StateGraph {
            states,
            transitions: Vec::new(),
        };

        for (state_idx, state_def) in def.states.iter().enumerate() {
            let first = graph.transitions.len();
            for transition_def in &state_def.transitions {
                let destination = graph.find_state(&transition_def.target).ok_or_else(|| {
                    SinewError::TransitionTargetNotFound {
                        transition: transition_def.name.clone(),
                        target: transition_def.target.clone(),
                    }
                })?;
                graph.transitions.push(Transition {
                    name: transition_def.name.clone(),
                    destination,
                    blend_time_ms: transition_def.fade_time,
                    sync: transition_def.sync,
                    curve: transition_def.curve,
                });
            }
            graph.states[state_idx].transitions = first..graph.transitions.len();
        }

        log::debug!(
            "Built state graph ({} states, {} transitions, max {} nodes)",
            graph.states.len(),
            graph.transitions.len(),
            graph.max_node_count()
        );
        Ok(graph)
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, index: usize) -> &State {
        &self.states[index]
    }

    /// Index of the first state called `name`
    pub fn find_state(&self, name: &str) -> Option<usize> {
        self.states.iter().position(|state| state.name == name)
    }

    /// Outgoing transitions of a state
    pub fn transitions(&self, state_idx: usize) -> &[Transition] {
        &self.transitions[self.states[state_idx].transitions.clone()]
    }

    /// First transition called `name` leaving the given state
    pub fn find_transition(&self, state_idx: usize, name: &str) -> Option<&Transition> {
        self.transitions(state_idx).iter().find(|t| t.name == name)
    }

    /// Largest template tree across all states, used to size layer trees once
    pub fn max_node_count(&self) -> usize {
        self.states.iter().map(|state| state.tree.len()).max().unwrap_or(0)
    }
}

fn build_tree(root: &NodeDef, clips: &ClipLibrary) -> Result<BlendTree> {
    let count = root.node_count();
    if count > u16::MAX as usize {
        return Err(SinewError::InvalidStateGraph(format!(
            "blend tree has {} nodes, limit is {}",
            count,
            u16::MAX
        )));
    }

    let mut tree = BlendTree::with_capacity(count);
    push_node(root, &mut tree, clips)?;
    Ok(tree)
}

/// Push `def` in pre-order: a node is followed by its whole left subtree,
/// then its right subtree, so child indices are known up front.
fn push_node(def: &NodeDef, tree: &mut BlendTree, clips: &ClipLibrary) -> Result<()> {
    let index = tree.len() as u16;
    match def {
        NodeDef::Clip { clip, looped, rate } => {
            let clip = clips
                .get(clip)
                .ok_or_else(|| SinewError::ClipNotFound(clip.clone()))?;
            tree.push(BlendNode::Value(Animation::new(clip, 0.0, *looped, *rate)));
        }
        NodeDef::Lerp {
            factor_name,
            factor_value,
            left,
            right,
        }
        | NodeDef::Additive {
            factor_name,
            factor_value,
            left,
            right,
        } => {
            let left_idx = index + 1;
            let right_idx = left_idx + left.node_count() as u16;
            let factor = BlendFactor::new(factor_name.as_deref(), *factor_value);
            let node = if matches!(def, NodeDef::Lerp { .. }) {
                BlendNode::Lerp {
                    left: left_idx,
                    right: right_idx,
                    factor,
                }
            } else {
                BlendNode::Additive {
                    left: left_idx,
                    right: right_idx,
                    factor,
                }
            };
            tree.push(node);
            push_node(left, tree, clips)?;
            push_node(right, tree, clips)?;
        }
    }
    Ok(())
}
