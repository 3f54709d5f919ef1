//! # pmoupnp - couche protocolaire UPnP
//!
//! Briques bas niveau pour piloter une passerelle Internet (IGD) :
//!
//! - [`ssdp`] : recherche M-SEARCH en multicast et lecture des réponses
//! - [`description`] : modèle de la description XML d'un device et parcours de l'arbre
//! - [`soap`] : construction et analyse des enveloppes SOAP, SOAP Faults
//! - [`urns`] : types de devices et services reconnus

pub mod description;
pub mod soap;
pub mod ssdp;
pub mod urns;
