//! Structures de l'enveloppe SOAP

use xmltree::Element;

/// Enveloppe SOAP complète
#[derive(Debug, Clone)]
pub struct SoapEnvelope {
    /// En-tête SOAP optionnel
    pub header: Option<SoapHeader>,

    /// Corps SOAP contenant l'action ou la réponse
    pub body: SoapBody,
}

/// En-tête SOAP
#[derive(Debug, Clone)]
pub struct SoapHeader {
    /// Contenu XML brut de l'en-tête
    pub content: Element,
}

/// Corps SOAP
#[derive(Debug, Clone)]
pub struct SoapBody {
    /// Contenu XML brut du corps
    pub content: Element,
}

impl SoapBody {
    /// Premier élément enfant du corps (l'action, sa réponse ou un Fault)
    pub fn first_element(&self) -> Option<&Element> {
        self.content.children.iter().find_map(|n| n.as_element())
    }
}
