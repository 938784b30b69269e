use std::sync::Arc;

use crate::{
    MapContext,
    error::{MapGenError, Result},
    foundation::FoundationContext,
};

impl MapContext {
    /// Attaches the foundation snapshot for this run.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::DimensionMismatch`] if the snapshot was built for a map of another size.
    pub fn set_foundation(&mut self, foundation: impl Into<Arc<FoundationContext>>) -> Result<()> {
        let foundation = foundation.into();
        let found = foundation.dimensions();
        let expected = self.dimensions();
        if found != expected {
            return Err(MapGenError::DimensionMismatch {
                width: expected.width(),
                height: expected.height(),
                found_width: found.width(),
                found_height: found.height(),
            });
        }
        self.foundation = Some(foundation);
        Ok(())
    }

    pub fn has_foundation_context(&self) -> bool {
        self.foundation.is_some()
    }

    /// Returns the foundation snapshot, failing if no earlier stage attached one.
    ///
    /// This is how a stage declares that it requires foundation data.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenError::FoundationUnavailable`] naming `stage`.
    pub fn assert_foundation_context(&self, stage: &str) -> Result<&Arc<FoundationContext>> {
        self.foundation.as_ref().ok_or_else(|| {
            tracing::error!(
                target: "mapgen::foundation",
                stage,
                "foundation.unavailable"
            );
            MapGenError::FoundationUnavailable {
                stage: stage.to_owned(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        MapContext,
        adapter::MockAdapter,
        error::MapGenError,
        foundation::{FoundationContext, FoundationOptions, WorldModel},
        grid::Dimensions,
        map_parameters::{FoundationConfig, MapGenConfig},
    };

    fn context(width: u32, height: u32) -> MapContext {
        let dimensions = Dimensions::new(width, height).unwrap();
        MapContext::new(
            dimensions,
            Box::new(MockAdapter::new(dimensions, 0)),
            MapGenConfig::default(),
        )
    }

    fn foundation(width: u32, height: u32) -> FoundationContext {
        let dimensions = Dimensions::new(width, height).unwrap();
        FoundationContext::new(
            WorldModel::zeroed(dimensions.size()),
            FoundationOptions {
                dimensions,
                config: FoundationConfig::default(),
            },
        )
        .unwrap()
    }

    #[test]
    fn missing_foundation_names_the_stage() {
        let context = context(4, 4);
        assert!(!context.has_foundation_context());
        let error = context.assert_foundation_context("landmassPlates").unwrap_err();
        assert!(
            matches!(&error, MapGenError::FoundationUnavailable { stage } if stage == "landmassPlates")
        );
        assert!(error.to_string().contains("\"landmassPlates\""));
    }

    #[test]
    fn attached_foundation_is_shared() {
        let mut context = context(4, 4);
        let foundation = Arc::new(foundation(4, 4));
        context.set_foundation(Arc::clone(&foundation)).unwrap();
        let attached = context.assert_foundation_context("corridors").unwrap();
        assert!(Arc::ptr_eq(attached, &foundation));
    }

    #[test]
    fn foundation_of_another_size_is_rejected() {
        let mut context = context(4, 4);
        assert!(matches!(
            context.set_foundation(foundation(5, 4)),
            Err(MapGenError::DimensionMismatch { found_width: 5, .. })
        ));
        assert!(!context.has_foundation_context());
    }
}
