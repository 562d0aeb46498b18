use crate::{SimError, SimTime, Simulation};

/// Simulation execution trait.
pub trait Execute {
    /// Executes the simulation until some stopping condition is reached.
    /// The condition is implementation-specific. Returns the number of events
    /// processed by this call.
    fn execute(self, sim: &mut Simulation) -> Result<u64, SimError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndCondition {
    Time(SimTime),
    NoEvents,
    Steps(usize),
}

/// Executor is used for simple execution of an entire simulation.
///
/// See the crate level documentation for examples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Executor {
    end_condition: EndCondition,
}

impl Executor {
    /// Simulation will end only once there are no events left in the queue.
    /// This only terminates when every generator has a limit.
    #[must_use]
    pub fn unbound() -> Self {
        Self {
            end_condition: EndCondition::NoEvents,
        }
    }

    /// Simulation runs every event strictly before `time`, then the clock is
    /// set to `time`. Events at or after the horizon stay in the queue.
    #[must_use]
    pub fn timed(time: SimTime) -> Self {
        Self {
            end_condition: EndCondition::Time(time),
        }
    }

    /// Simulation will execute exactly this many steps, unless we run out of events.
    #[must_use]
    pub fn steps(steps: usize) -> Self {
        Self {
            end_condition: EndCondition::Steps(steps),
        }
    }

    /// Registers a side effect that is called _after_ each simulation step.
    #[must_use]
    pub fn side_effect<F>(self, func: F) -> ExecutorWithSideEffect<F>
    where
        F: FnMut(&Simulation),
    {
        ExecutorWithSideEffect {
            end_condition: self.end_condition,
            side_effect: func,
        }
    }
}

impl Execute for Executor {
    fn execute(self, sim: &mut Simulation) -> Result<u64, SimError> {
        run_with(sim, self.end_condition, |_| {})
    }
}

pub struct ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation),
{
    end_condition: EndCondition,
    side_effect: F,
}

impl<F> Execute for ExecutorWithSideEffect<F>
where
    F: FnMut(&Simulation),
{
    fn execute(self, sim: &mut Simulation) -> Result<u64, SimError> {
        run_with(sim, self.end_condition, self.side_effect)
    }
}

fn run_with<F>(sim: &mut Simulation, end_condition: EndCondition, mut side_effect: F) -> Result<u64, SimError>
where
    F: FnMut(&Simulation),
{
    sim.begin()?;
    let mut processed = 0;
    let mut step_fn = |sim: &mut Simulation| -> Result<bool, SimError> {
        let stepped = sim.step()?;
        if stepped {
            processed += 1;
            side_effect(sim);
        }
        Ok(stepped)
    };
    match end_condition {
        EndCondition::Time(time) => execute_until(sim, time, &mut step_fn)?,
        EndCondition::NoEvents => execute_until_empty(sim, &mut step_fn)?,
        EndCondition::Steps(steps) => execute_steps(sim, steps, &mut step_fn)?,
    }
    sim.halt();
    Ok(processed)
}

fn execute_until_empty<F>(sim: &mut Simulation, step: &mut F) -> Result<(), SimError>
where
    F: FnMut(&mut Simulation) -> Result<bool, SimError>,
{
    while step(sim)? {}
    Ok(())
}

fn execute_until<F>(sim: &mut Simulation, time: SimTime, step: &mut F) -> Result<(), SimError>
where
    F: FnMut(&mut Simulation) -> Result<bool, SimError>,
{
    while sim.peek_next_event_time().is_some_and(|t| t < time) {
        step(sim)?;
    }
    sim.advance_clock(time);
    Ok(())
}

fn execute_steps<F>(sim: &mut Simulation, steps: usize, step: &mut F) -> Result<(), SimError>
where
    F: FnMut(&mut Simulation) -> Result<bool, SimError>,
{
    for _ in 0..steps {
        if !step(sim)? {
            break;
        }
    }
    Ok(())
}
