//! Collaborator bundles passed into each strategist call.

use colony_state::{
    Colony, ColonyRegistry, Notifier, OperationRegistry, PathPlanner, SiteGraph, WorldState,
};

/// Read-only queries the scorer and selector need.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub graph: &'a dyn SiteGraph,
    pub world: &'a dyn WorldState,
    pub colonies: &'a dyn ColonyRegistry,
}

impl<'a> WorldView<'a> {
    pub fn new(
        graph: &'a dyn SiteGraph,
        world: &'a dyn WorldState,
        colonies: &'a dyn ColonyRegistry,
    ) -> Self {
        Self {
            graph,
            world,
            colonies,
        }
    }

    /// Builds a view from one object serving every query.
    pub fn of<T>(source: &'a T) -> Self
    where
        T: SiteGraph + WorldState + ColonyRegistry,
    {
        Self::new(source, source, source)
    }

    /// All colonies in registry order.
    pub fn all_colonies(&self) -> &'a [Colony] {
        self.colonies.all_colonies()
    }
}

/// Everything one `on_tick` call reads and writes.
pub struct TickContext<'a> {
    pub view: WorldView<'a>,
    pub planner: &'a dyn PathPlanner,
    pub operations: &'a mut dyn OperationRegistry,
    pub notifier: &'a mut dyn Notifier,
}

impl<'a> TickContext<'a> {
    pub fn new(
        view: WorldView<'a>,
        planner: &'a dyn PathPlanner,
        operations: &'a mut dyn OperationRegistry,
        notifier: &'a mut dyn Notifier,
    ) -> Self {
        Self {
            view,
            planner,
            operations,
            notifier,
        }
    }
}
