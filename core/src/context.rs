use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tracing::debug;

use rotask_types::{ResponseJudge, StimulusCatalog};

use crate::collaborators::{InputEvent, InputSource, KeyPress, Presentation, Renderer, Screen};
use crate::errors::{Interrupt, SessionError};

/// Everything a phase needs, passed in explicitly.
///
/// One random source serves stimulus choice, baseline rotation, training
/// draws and the workload shuffle, so a seeded context replays a whole
/// session.
pub struct SessionContext<'a> {
    rng: StdRng,
    catalog: &'a StimulusCatalog,
    judge: &'a ResponseJudge,
    renderer: &'a mut dyn Renderer,
    input: &'a mut dyn InputSource,
}

impl<'a> SessionContext<'a> {
    pub fn new(
        rng: StdRng,
        catalog: &'a StimulusCatalog,
        judge: &'a ResponseJudge,
        renderer: &'a mut dyn Renderer,
        input: &'a mut dyn InputSource,
    ) -> Self {
        Self {
            rng,
            catalog,
            judge,
            renderer,
            input,
        }
    }

    /// Seeded from `seed` when given, otherwise from the OS.
    pub fn with_seed(
        seed: Option<u64>,
        catalog: &'a StimulusCatalog,
        judge: &'a ResponseJudge,
        renderer: &'a mut dyn Renderer,
        input: &'a mut dyn InputSource,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng, catalog, judge, renderer, input)
    }

    #[must_use]
    pub fn catalog(&self) -> &'a StimulusCatalog {
        self.catalog
    }

    #[must_use]
    pub fn judge(&self) -> &'a ResponseJudge {
        self.judge
    }

    pub fn rng(&mut self) -> &mut impl Rng {
        &mut self.rng
    }

    pub(crate) fn present(&mut self, presentation: &Presentation) -> Result<(), Interrupt> {
        self.renderer
            .present(presentation)
            .map_err(|e| Interrupt::Failed(SessionError::Display(e)))
    }

    pub(crate) fn show(&mut self, screen: &Screen) -> Result<(), Interrupt> {
        self.renderer
            .show(screen)
            .map_err(|e| Interrupt::Failed(SessionError::Display(e)))
    }

    /// Block for the next key press. Cancellation becomes `Interrupt::Cancelled`.
    pub(crate) fn wait_key(&mut self) -> Result<KeyPress, Interrupt> {
        match self.input.wait_for_keydown_or_cancel() {
            Ok(InputEvent::Key(press)) => Ok(press),
            Ok(InputEvent::Cancel) => Err(Interrupt::Cancelled),
            Err(e) => Err(Interrupt::Failed(SessionError::Input(e))),
        }
    }

    /// Next key that went down at or after `since`. Earlier presses were
    /// typed ahead of the frame and are dropped.
    pub(crate) fn wait_key_since(&mut self, since: Instant) -> Result<KeyPress, Interrupt> {
        loop {
            let press = self.wait_key()?;
            if press.at >= since {
                return Ok(press);
            }
            debug!(key = %press.key, "Discarding key pressed before the frame was shown");
        }
    }

    /// Show `screen` and wait for any key pressed after it appeared.
    pub(crate) fn acknowledge(&mut self, screen: &Screen) -> Result<(), Interrupt> {
        self.show(screen)?;
        let shown_at = Instant::now();
        self.wait_key_since(shown_at).map(|_| ())
    }
}
