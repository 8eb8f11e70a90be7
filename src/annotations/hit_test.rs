//! Hit testing of annotations and resize handles in screen space

use crate::config::Tool;
use crate::domain::{Annotation, AnnotationId, Handle, Point, Rect, rotate_point};
use crate::render::TextMeasure;
use crate::render::geometry::bounding_rect;
use crate::session::{AnnotationStore, CoordinateSpace};

/// Extra screen-space margin around an annotation that still counts as a hit
pub const HIT_SLOP: f32 = 10.0;
/// Side of the square around a corner handle that grabs it
pub const HANDLE_SIZE: f32 = 16.0;

/// Pointer feedback for the current hover position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Resize(Handle),
    Move,
    Rotate,
    Crosshair,
    Default,
}

/// Padded bounding rect of an annotation mapped to screen space (unrotated)
pub fn screen_bounds(annotation: &Annotation, space: &CoordinateSpace, measure: &dyn TextMeasure) -> Rect {
    space.rect_to_screen(&bounding_rect(annotation, measure))
}

/// Topmost annotation under a screen point
pub fn hit_annotation(
    annotations: &[Annotation],
    point: Point,
    space: &CoordinateSpace,
    measure: &dyn TextMeasure,
) -> Option<AnnotationId> {
    annotations
        .iter()
        .rev()
        .find(|a| {
            screen_bounds(a, space, measure)
                .expand(HIT_SLOP)
                .contains_point(point)
        })
        .map(|a| a.id)
}

/// Screen positions of the four corner handles, following the annotation's rotation
pub fn handle_positions(
    annotation: &Annotation,
    space: &CoordinateSpace,
    measure: &dyn TextMeasure,
) -> [(Handle, Point); 4] {
    let rect = screen_bounds(annotation, space, measure);
    let center = rect.center();
    let corners = rect.corners();
    Handle::ALL.map(|handle| {
        let corner = match handle {
            Handle::TopLeft => corners[0],
            Handle::TopRight => corners[1],
            Handle::BottomLeft => corners[2],
            Handle::BottomRight => corners[3],
        };
        (handle, rotate_point(corner, center, annotation.rotation))
    })
}

/// Corner handle of `annotation` under a screen point
pub fn hit_handle(
    annotation: &Annotation,
    point: Point,
    space: &CoordinateSpace,
    measure: &dyn TextMeasure,
) -> Option<Handle> {
    let half = HANDLE_SIZE / 2.0;
    handle_positions(annotation, space, measure)
        .into_iter()
        .find(|(_, pos)| {
            Rect::from_xywh(pos.x - half, pos.y - half, HANDLE_SIZE, HANDLE_SIZE).contains_point(point)
        })
        .map(|(handle, _)| handle)
}

/// Cursor to show while hovering `point` without a button held
pub fn hover_cursor(
    store: &AnnotationStore,
    tool: Tool,
    point: Point,
    space: &CoordinateSpace,
    measure: &dyn TextMeasure,
) -> Cursor {
    if let Some(selected) = store.selected_annotation()
        && let Some(handle) = hit_handle(selected, point, space, measure)
    {
        return Cursor::Resize(handle);
    }
    if hit_annotation(store.annotations(), point, space, measure).is_some() {
        return Cursor::Move;
    }
    if store.selection().len() == 1 {
        return Cursor::Rotate;
    }
    if tool == Tool::Select {
        Cursor::Crosshair
    } else {
        Cursor::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnnotationKind;
    use crate::render::FallbackMetrics;
    use std::f32::consts::FRAC_PI_2;

    fn rect_ann(id: u64, left: f32, top: f32, right: f32, bottom: f32) -> Annotation {
        Annotation::new(
            AnnotationId(id),
            AnnotationKind::Rectangle,
            Point::new(left, top),
            Point::new(right, bottom),
        )
    }

    #[test]
    fn test_topmost_wins() {
        let space = CoordinateSpace::identity(200.0, 200.0);
        let list = vec![rect_ann(1, 10.0, 10.0, 100.0, 100.0), rect_ann(2, 50.0, 50.0, 150.0, 150.0)];
        let hit = hit_annotation(&list, Point::new(60.0, 60.0), &space, &FallbackMetrics);
        assert_eq!(hit, Some(AnnotationId(2)));
        let hit = hit_annotation(&list, Point::new(20.0, 20.0), &space, &FallbackMetrics);
        assert_eq!(hit, Some(AnnotationId(1)));
    }

    #[test]
    fn test_hit_slop() {
        let space = CoordinateSpace::identity(200.0, 200.0);
        // Stroke 2 pads the box to 8..102, slop extends to -2..112 (right exclusive)
        let list = vec![rect_ann(1, 10.0, 10.0, 100.0, 100.0)];
        assert!(hit_annotation(&list, Point::new(111.0, 50.0), &space, &FallbackMetrics).is_some());
        assert!(hit_annotation(&list, Point::new(112.0, 50.0), &space, &FallbackMetrics).is_none());
    }

    #[test]
    fn test_hit_maps_through_scale() {
        let space = CoordinateSpace::new(200.0, 200.0, Rect::from_xywh(0.0, 0.0, 100.0, 100.0));
        let list = vec![rect_ann(1, 150.0, 150.0, 190.0, 190.0)];
        assert!(hit_annotation(&list, Point::new(85.0, 85.0), &space, &FallbackMetrics).is_some());
        assert!(hit_annotation(&list, Point::new(40.0, 40.0), &space, &FallbackMetrics).is_none());
    }

    #[test]
    fn test_handle_hit_unrotated() {
        let space = CoordinateSpace::identity(200.0, 200.0);
        let a = rect_ann(1, 20.0, 20.0, 80.0, 60.0);
        // Padded box is 18..82 x 18..62
        assert_eq!(hit_handle(&a, Point::new(82.0, 62.0), &space, &FallbackMetrics), Some(Handle::BottomRight));
        assert_eq!(hit_handle(&a, Point::new(12.0, 13.0), &space, &FallbackMetrics), Some(Handle::TopLeft));
        assert_eq!(hit_handle(&a, Point::new(50.0, 40.0), &space, &FallbackMetrics), None);
    }

    #[test]
    fn test_handles_follow_rotation() {
        let space = CoordinateSpace::identity(200.0, 200.0);
        let a = rect_ann(1, 20.0, 20.0, 80.0, 60.0).with_rotation(FRAC_PI_2);
        // Center (50, 40); bottom-right corner (82, 62) turns to (28, 72)
        let positions = handle_positions(&a, &space, &FallbackMetrics);
        let (_, br) = positions[3];
        assert!((br.x - 28.0).abs() < 1e-3 && (br.y - 72.0).abs() < 1e-3);
        assert_eq!(hit_handle(&a, Point::new(28.0, 72.0), &space, &FallbackMetrics), Some(Handle::BottomRight));
        assert_eq!(hit_handle(&a, Point::new(82.0, 62.0), &space, &FallbackMetrics), None);
    }

    #[test]
    fn test_hover_cursor() {
        let space = CoordinateSpace::identity(200.0, 200.0);
        let mut store = AnnotationStore::from_annotations(vec![rect_ann(1, 20.0, 20.0, 80.0, 60.0)]);
        let m = &FallbackMetrics;
        assert_eq!(hover_cursor(&store, Tool::Select, Point::new(150.0, 150.0), &space, m), Cursor::Crosshair);
        assert_eq!(hover_cursor(&store, Tool::Pen, Point::new(150.0, 150.0), &space, m), Cursor::Default);
        assert_eq!(hover_cursor(&store, Tool::Pen, Point::new(50.0, 40.0), &space, m), Cursor::Move);

        store.select(AnnotationId(1));
        assert_eq!(hover_cursor(&store, Tool::Pen, Point::new(150.0, 150.0), &space, m), Cursor::Rotate);
        assert_eq!(
            hover_cursor(&store, Tool::Pen, Point::new(82.0, 62.0), &space, m),
            Cursor::Resize(Handle::BottomRight)
        );
    }
}
