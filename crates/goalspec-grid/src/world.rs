use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use anyhow::Context;
use goalspec::GroundedDomain;
use goalspec_logic::{Atom, Model, Term};
use goalspec_search::{SearchDomain, Transition};
use serde::{Deserialize, Serialize};

use crate::{GridError, Result};

/// Predicates owned by the grid itself; colours may not reuse them.
const RESERVED: [&str; 6] = ["at", "cell", "wall", "key", "holding", "free"];

/// Serializable description of a grid world.
///
/// ```yaml
/// width: 3
/// height: 3
/// walls: [[1, 1]]
/// key: [1, 0]
/// colors:
///   red: [[2, 0], [2, 2]]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub width: i64,
    pub height: i64,
    #[serde(default)]
    pub walls: Vec<[i64; 2]>,
    #[serde(default)]
    pub key: Option<[i64; 2]>,
    #[serde(default)]
    pub colors: BTreeMap<String, Vec<[i64; 2]>>,
}

/// Agent position and whether it carries the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridState {
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub holding_key: bool,
}

impl GridState {
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            holding_key: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridAction {
    Up,
    Right,
    Down,
    Left,
}

impl GridAction {
    /// Fixed expansion order
    pub const ALL: [GridAction; 4] = [
        GridAction::Up,
        GridAction::Right,
        GridAction::Down,
        GridAction::Left,
    ];

    pub fn delta(self) -> (i64, i64) {
        match self {
            GridAction::Up => (0, -1),
            GridAction::Right => (1, 0),
            GridAction::Down => (0, 1),
            GridAction::Left => (-1, 0),
        }
    }
}

impl fmt::Display for GridAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GridAction::Up => "U",
            GridAction::Right => "R",
            GridAction::Down => "D",
            GridAction::Left => "L",
        };
        f.write_str(s)
    }
}

/// Four-connected grid with walls, coloured cells and an optional key.
///
/// Entering the key cell picks the key up. Every move costs 1.
#[derive(Debug, Clone)]
pub struct GridWorld {
    width: i64,
    height: i64,
    walls: BTreeSet<(i64, i64)>,
    key: Option<(i64, i64)>,
    colors: BTreeMap<String, BTreeSet<(i64, i64)>>,
}

pub fn at_atom(x: i64, y: i64) -> Atom {
    Atom::new("at", vec![Term::int(x), Term::int(y)])
}

pub fn holding_key() -> Atom {
    Atom::new("holding", vec![Term::sym("key")])
}

pub fn free_key() -> Atom {
    Atom::new("free", vec![Term::sym("key")])
}

impl GridWorld {
    pub fn from_layout(layout: GridLayout) -> Result<Self> {
        if layout.width <= 0 || layout.height <= 0 {
            return Err(GridError::EmptyGrid {
                width: layout.width,
                height: layout.height,
            });
        }

        let mut world = Self {
            width: layout.width,
            height: layout.height,
            walls: BTreeSet::new(),
            key: None,
            colors: BTreeMap::new(),
        };

        for [x, y] in layout.walls {
            world.check_bounds(x, y)?;
            world.walls.insert((x, y));
        }

        if let Some([x, y]) = layout.key {
            world.check_bounds(x, y)?;
            if world.walls.contains(&(x, y)) {
                return Err(GridError::KeyOnWall { x, y });
            }
            world.key = Some((x, y));
        }

        for (name, cells) in layout.colors {
            let valid_name = name.starts_with(|c: char| c.is_ascii_lowercase())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid_name || RESERVED.contains(&name.as_str()) {
                return Err(GridError::InvalidColor(name));
            }
            let mut set = BTreeSet::new();
            for [x, y] in cells {
                world.check_bounds(x, y)?;
                set.insert((x, y));
            }
            world.colors.insert(name, set);
        }

        Ok(world)
    }

    /// Load a layout from YAML, or JSON when the extension is `.json`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read grid layout from {}", path.display()))?;
        let layout: GridLayout = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse grid layout from {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse grid layout from {}", path.display()))?
        };
        Self::from_layout(layout)
            .with_context(|| format!("Invalid grid layout in {}", path.display()))
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn key(&self) -> Option<(i64, i64)> {
        self.key
    }

    fn check_bounds(&self, x: i64, y: i64) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(GridError::OutOfBounds { x, y });
        }
        Ok(())
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn is_open(&self, x: i64, y: i64) -> bool {
        self.in_bounds(x, y) && !self.walls.contains(&(x, y))
    }

    /// Open cells in row-major order
    pub fn open_cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(move |&(x, y)| self.is_open(x, y))
    }

    /// Validate a start state against the layout.
    pub fn check_state(&self, state: &GridState) -> Result<()> {
        if !self.is_open(state.x, state.y) {
            return Err(GridError::BlockedStart {
                x: state.x,
                y: state.y,
            });
        }
        if state.holding_key && self.key.is_none() {
            return Err(GridError::NoKey);
        }
        Ok(())
    }

    pub fn step(&self, state: &GridState, action: GridAction) -> Option<GridState> {
        let (dx, dy) = action.delta();
        let (x, y) = (state.x + dx, state.y + dy);
        if !self.is_open(x, y) {
            return None;
        }
        Some(GridState {
            x,
            y,
            holding_key: state.holding_key || self.key == Some((x, y)),
        })
    }

    /// Atoms true in a state
    pub fn state_model(&self, state: &GridState) -> Model {
        let mut model = Model::new();
        model.insert(at_atom(state.x, state.y));
        if self.key.is_some() {
            model.insert(if state.holding_key {
                holding_key()
            } else {
                free_key()
            });
        }
        model
    }

    /// Cell named by the goal's `at` atom, if any
    pub fn goal_cell(goal: &Model) -> Option<(i64, i64)> {
        goal.with_predicate("at").find_map(|atom| match atom.args.as_slice() {
            [Term::Int(x), Term::Int(y)] => Some((*x, *y)),
            _ => None,
        })
    }

    /// Text picture of the grid, one row per line.
    ///
    /// `#` wall, `k` uncollected key, `A` agent, a colour's initial for
    /// coloured cells and `.` otherwise.
    pub fn render(&self, agent: Option<&GridState>) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let ch = if agent.is_some_and(|s| (s.x, s.y) == (x, y)) {
                    'A'
                } else if self.walls.contains(&(x, y)) {
                    '#'
                } else if self.key == Some((x, y)) && !agent.is_some_and(|s| s.holding_key) {
                    'k'
                } else {
                    self.colors
                        .iter()
                        .find(|(_, cells)| cells.contains(&(x, y)))
                        .and_then(|(name, _)| name.chars().next())
                        .unwrap_or('.')
                };
                out.push(ch);
            }
            if y + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)?;
        if self.holding_key {
            write!(f, " holding key")?;
        }
        Ok(())
    }
}

impl SearchDomain for GridWorld {
    type State = GridState;
    type Action = GridAction;
    type Goal = Model;

    fn expand(&self, states: &[GridState]) -> Vec<Vec<Transition<GridState, GridAction>>> {
        states
            .iter()
            .map(|state| {
                GridAction::ALL
                    .into_iter()
                    .filter_map(|action| {
                        self.step(state, action)
                            .map(|next| Transition::new(next, action, 1.0))
                    })
                    .collect()
            })
            .collect()
    }

    fn is_solved(&self, states: &[GridState], goals: &[Model]) -> Vec<bool> {
        states
            .iter()
            .zip(goals)
            .map(|(state, goal)| goal.is_subset(&self.state_model(state)))
            .collect()
    }
}

impl GroundedDomain for GridWorld {
    fn ground_atoms(&self) -> Vec<Atom> {
        let mut atoms: Vec<Atom> = self.open_cells().map(|(x, y)| at_atom(x, y)).collect();
        if self.key.is_some() {
            atoms.push(holding_key());
            atoms.push(free_key());
        }
        atoms
    }

    fn background_facts(&self) -> Vec<String> {
        let mut facts: Vec<String> = self
            .open_cells()
            .map(|(x, y)| format!("cell({x},{y})."))
            .collect();
        facts.extend(self.walls.iter().map(|(x, y)| format!("wall({x},{y}).")));
        for (name, cells) in &self.colors {
            facts.extend(cells.iter().map(|(x, y)| format!("{name}({x},{y}).")));
        }
        if let Some((x, y)) = self.key {
            facts.push(format!("key({x},{y})."));
        }
        facts
    }

    fn on_model(&self, model: &Model) -> bool {
        model.with_predicate("at").count() <= 1
            && !(model.contains(&holding_key()) && model.contains(&free_key()))
    }

    fn models_to_goals(&self, models: &[Model]) -> Vec<Model> {
        models.to_vec()
    }

    fn states_to_models(&self, states: &[GridState]) -> Vec<Model> {
        states.iter().map(|s| self.state_model(s)).collect()
    }
}
