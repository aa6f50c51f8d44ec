use crate::error::Error;
use crate::mask::{self, Mask};
use crate::pupil::PupilParams;
use crate::zernike::Noll;
use crate::GRID_DIM;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

/// Runs a callback once on the next display refresh. The store leans on
/// this to coalesce bursts of edits into one notification per tick.
pub trait TickScheduler {
    fn schedule(&self, tick: Box<dyn FnOnce()>);
}

/// Queue-backed scheduler for tests and headless drivers: each
/// `run_next` call stands in for one display tick.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl ManualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Runs the next queued tick; returns false when none was pending.
    pub fn run_next(&self) -> bool {
        let tick = self.queue.borrow_mut().pop_front();
        match tick {
            Some(tick) => {
                tick();
                true
            }
            None => false,
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&self, tick: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(tick);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpticalParam {
    Wavelength,
    Na,
    Sigma,
    Defocus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewParam {
    Threshold,
    CrossSectionRow,
}

/// Display-side settings: the resist render threshold and the row the
/// 1-D cross section is taken from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    pub threshold: f64,
    pub cross_section_row: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        ViewParams {
            threshold: 0.3,
            cross_section_row: GRID_DIM / 2,
        }
    }
}

/// Snapshot of everything the simulator renders from. Cloning is cheap;
/// the mask is shared and only ever replaced wholesale.
#[derive(Clone, Debug)]
pub struct SimState {
    pub mask: Arc<Mask>,
    pub params: PupilParams,
    pub view: ViewParams,
}

impl Default for SimState {
    fn default() -> Self {
        SimState {
            mask: Arc::new(mask::blank(GRID_DIM)),
            params: PupilParams::default(),
            view: ViewParams::default(),
        }
    }
}

type Listener = Rc<dyn Fn(&SimState)>;

struct StoreInner {
    state: SimState,
    listeners: Vec<Listener>,
    notify_pending: bool,
}

/// Observable parameter store. Single-threaded: mutation and
/// notification happen on the one thread that drives the simulator.
///
/// Every setter marks the state dirty; the first mark after a clean
/// tick schedules a drain, and the drain clears the dirty flag before
/// invoking listeners, so a listener that mutates the store queues the
/// next tick instead of re-entering the current one.
#[derive(Clone)]
pub struct SimStore {
    inner: Rc<RefCell<StoreInner>>,
    scheduler: Rc<dyn TickScheduler>,
}

impl SimStore {
    pub fn new(scheduler: Rc<dyn TickScheduler>) -> Self {
        SimStore {
            inner: Rc::new(RefCell::new(StoreInner {
                state: SimState::default(),
                listeners: Vec::new(),
                notify_pending: false,
            })),
            scheduler,
        }
    }

    pub fn get_state(&self) -> SimState {
        self.inner.borrow().state.clone()
    }

    /// Registers a listener invoked with the full state once per tick in
    /// which anything changed.
    pub fn subscribe(&self, listener: impl Fn(&SimState) + 'static) {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub fn set_mask(&self, mask: Mask) {
        self.mutate(|state| state.mask = Arc::new(mask));
    }

    /// Accepts any finite value; range clamping belongs to the UI layer.
    pub fn set_param(&self, param: OpticalParam, value: f64) -> Result<(), Error> {
        check_finite("optical parameter", value)?;
        self.mutate(|state| match param {
            OpticalParam::Wavelength => state.params.wavelength_nm = value,
            OpticalParam::Na => state.params.na = value,
            OpticalParam::Sigma => state.params.sigma = value,
            OpticalParam::Defocus => state.params.defocus_um = value,
        });
        Ok(())
    }

    pub fn set_zernike(&self, term: Noll, waves: f64) -> Result<(), Error> {
        check_finite("zernike coefficient", waves)?;
        self.mutate(|state| state.params.zernike.set(term, waves));
        Ok(())
    }

    pub fn set_view_param(&self, param: ViewParam, value: f64) -> Result<(), Error> {
        check_finite("view parameter", value)?;
        self.mutate(|state| match param {
            ViewParam::Threshold => state.view.threshold = value,
            ViewParam::CrossSectionRow => state.view.cross_section_row = value as usize,
        });
        Ok(())
    }

    /// Restores the optical defaults; the mask and view settings stay.
    pub fn reset_params(&self) {
        self.mutate(|state| state.params = PupilParams::default());
    }

    /// Synchronous publication of the current state, used for the
    /// initial paint. Swallows any pending tick, which would otherwise
    /// re-deliver the same snapshot.
    pub fn notify_now(&self) {
        let (state, listeners) = {
            let mut inner = self.inner.borrow_mut();
            inner.notify_pending = false;
            (inner.state.clone(), inner.listeners.clone())
        };
        for listener in &listeners {
            listener(&state);
        }
    }

    fn mutate(&self, edit: impl FnOnce(&mut SimState)) {
        {
            let mut inner = self.inner.borrow_mut();
            edit(&mut inner.state);
            if inner.notify_pending {
                return;
            }
            inner.notify_pending = true;
        }

        let weak = Rc::downgrade(&self.inner);
        self.scheduler.schedule(Box::new(move || {
            Self::drain(&weak);
        }));
    }

    fn drain(weak: &Weak<RefCell<StoreInner>>) {
        let cell = match weak.upgrade() {
            Some(cell) => cell,
            None => return,
        };
        let (state, listeners) = {
            let mut inner = cell.borrow_mut();
            if !inner.notify_pending {
                return;
            }
            inner.notify_pending = false;
            (inner.state.clone(), inner.listeners.clone())
        };
        // the borrow is released here so listeners may call back in
        for listener in &listeners {
            listener(&state);
        }
    }
}

fn check_finite(what: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::NonFinite { what, value })
    }
}
