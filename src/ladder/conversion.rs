use super::definition::ProgramDefinition;
use crate::error::ConversionError;

/// A trait for editor data models that can be converted into a `ProgramDefinition`.
///
/// This is the primary extension point for keeping the compiler format-agnostic.
/// By implementing this trait on your own save-file structs, you provide the
/// translation layer that lets the compiler process your diagrams.
///
/// # Example
///
/// ```rust,no_run
/// use kairo::prelude::*;
///
/// // 1. Define your custom structs for parsing your format.
/// struct MyContact { tag: String }
/// struct MyRung { contacts: Vec<MyContact>, coil: String }
///
/// // 2. Implement `IntoProgram` for your top-level struct.
/// impl IntoProgram for MyRung {
///     fn into_program(self) -> std::result::Result<ProgramDefinition, ConversionError> {
///         let mut network = NetworkDefinition::new(1, "converted")
///             .element(ElementDefinition::left_rail("L"))
///             .element(ElementDefinition::right_rail("R"));
///         let mut previous = "L".to_string();
///         for contact in self.contacts {
///             network = network
///                 .element(ElementDefinition::new(
///                     contact.tag.clone(),
///                     ElementKind::NormallyOpenContact,
///                     contact.tag.clone(),
///                 ))
///                 .wire(&previous, &contact.tag);
///             previous = contact.tag;
///         }
///         network = network
///             .element(ElementDefinition::new("coil", ElementKind::OutputCoil, self.coil))
///             .wire(&previous, "coil")
///             .wire("coil", "R");
///         Ok(ProgramDefinition::new("Converted").with_network(network))
///     }
/// }
/// ```
pub trait IntoProgram {
    /// Consumes the object and converts it into a compiler-ready program.
    fn into_program(self) -> Result<ProgramDefinition, ConversionError>;
}

impl IntoProgram for ProgramDefinition {
    fn into_program(self) -> Result<ProgramDefinition, ConversionError> {
        Ok(self)
    }
}
