//! DNS messages.

use crate::edns::Edns;
use crate::error::{Error, Result};
use crate::header::{Header, HEADER_LEN};
use crate::iana::{RecordType, Rcode};
use crate::name::Name;
use crate::question::Question;
use crate::record::{Record, SectionParser};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete DNS message: header, question, and the answer, authority,
/// and additional sections. An OPT pseudo-record is lifted out of the
/// additional section into [`Message::edns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    header: Header,
    questions: Vec<Question>,
    answers: Vec<Record>,
    authority: Vec<Record>,
    additional: Vec<Record>,
    edns: Option<Edns>,
}

impl Message {
    /// Creates a query message with a single question, a random ID, and
    /// the RD bit clear.
    pub fn query(question: Question) -> Self {
        let mut header = Header::query();
        header.qd_count = 1;
        Self {
            header,
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            edns: None,
        }
    }

    /// Creates a response message answering `query`.
    pub fn response_to(query: &Message) -> Self {
        Self {
            header: Header::response_to(&query.header),
            questions: query.questions.clone(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
            edns: None,
        }
    }

    /// Returns the header.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    #[inline]
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Returns the transaction ID.
    #[inline]
    pub fn id(&self) -> u16 {
        self.header.id
    }

    /// Sets the transaction ID.
    #[inline]
    pub fn set_id(&mut self, id: u16) {
        self.header.id = id;
    }

    /// Returns the response code.
    #[inline]
    pub fn rcode(&self) -> Rcode {
        self.header.rcode
    }

    /// Sets the response code.
    #[inline]
    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.header.rcode = rcode;
    }

    /// Returns the first question, if any.
    #[inline]
    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Returns all questions.
    #[inline]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns a mutable reference to the first question, if any.
    #[inline]
    pub fn question_mut(&mut self) -> Option<&mut Question> {
        self.questions.first_mut()
    }

    /// Rewrites the name of the first question.
    ///
    /// The iterative driver reuses one query message across hops, swapping
    /// the name as CNAME chains redirect it.
    pub fn set_question_name(&mut self, qname: Name) {
        if let Some(q) = self.questions.first_mut() {
            q.qname = qname;
        }
    }

    /// Returns the answer section.
    #[inline]
    pub fn answers(&self) -> &[Record] {
        &self.answers
    }

    /// Returns the authority section.
    #[inline]
    pub fn authority(&self) -> &[Record] {
        &self.authority
    }

    /// Returns the additional section, excluding any OPT record.
    #[inline]
    pub fn additional(&self) -> &[Record] {
        &self.additional
    }

    /// Returns the EDNS parameters, if present.
    #[inline]
    pub fn edns(&self) -> Option<&Edns> {
        self.edns.as_ref()
    }

    /// Attaches or replaces the EDNS parameters.
    pub fn set_edns(&mut self, edns: Edns) {
        self.edns = Some(edns);
        self.update_ar_count();
    }

    /// Adds an answer record.
    pub fn add_answer(&mut self, record: Record) {
        self.answers.push(record);
        self.header.an_count = self.answers.len() as u16;
    }

    /// Adds an authority record.
    pub fn add_authority(&mut self, record: Record) {
        self.authority.push(record);
        self.header.ns_count = self.authority.len() as u16;
    }

    /// Adds an additional record.
    pub fn add_additional(&mut self, record: Record) {
        self.additional.push(record);
        self.update_ar_count();
    }

    /// The OPT pseudo-record counts toward ARCOUNT even though it lives
    /// outside the additional section here.
    fn update_ar_count(&mut self) {
        self.header.ar_count = self.additional.len() as u16 + u16::from(self.edns.is_some());
    }

    /// Returns true if the TC bit is set.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.header.is_truncated()
    }

    /// Parses a message from wire format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = Header::parse(data)?;
        let mut offset = HEADER_LEN;

        let mut questions = Vec::with_capacity(header.qd_count as usize);
        for _ in 0..header.qd_count {
            let (q, consumed) = Question::parse(data, offset)?;
            questions.push(q);
            offset += consumed;
        }

        let mut answers = Vec::with_capacity(header.an_count as usize);
        let mut parser = SectionParser::new(data, offset, header.an_count);
        while let Some(r) = parser.next()? {
            answers.push(r);
        }
        offset = parser.offset();

        let mut authority = Vec::with_capacity(header.ns_count as usize);
        let mut parser = SectionParser::new(data, offset, header.ns_count);
        while let Some(r) = parser.next()? {
            authority.push(r);
        }
        offset = parser.offset();

        let mut additional = Vec::new();
        let mut edns = None;
        let mut parser = SectionParser::new(data, offset, header.ar_count);
        while let Some(r) = parser.next()? {
            if r.rtype == RecordType::OPT.to_u16() {
                if edns.is_some() {
                    return Err(Error::DuplicateOpt);
                }
                let mut rdata = BytesMut::new();
                r.rdata.write_to(&mut rdata);
                edns = Some(Edns::from_opt(r.rclass, r.ttl, &rdata)?);
            } else {
                additional.push(r);
            }
        }

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
            edns,
        })
    }

    /// Returns the wire length of the serialized message.
    pub fn wire_len(&self) -> usize {
        HEADER_LEN
            + self.questions.iter().map(Question::wire_len).sum::<usize>()
            + self.answers.iter().map(Record::wire_len).sum::<usize>()
            + self.authority.iter().map(Record::wire_len).sum::<usize>()
            + self.additional.iter().map(Record::wire_len).sum::<usize>()
            + self.edns.as_ref().map_or(0, Edns::wire_len)
    }

    /// Serializes the message to wire format.
    pub fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());

        let mut header = self.header.clone();
        header.qd_count = self.questions.len() as u16;
        header.an_count = self.answers.len() as u16;
        header.ns_count = self.authority.len() as u16;
        header.ar_count = self.additional.len() as u16 + u16::from(self.edns.is_some());
        header.write_to(&mut buf);

        for q in &self.questions {
            q.write_to(&mut buf);
        }
        for r in self
            .answers
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
        {
            r.write_to(&mut buf);
        }
        if let Some(edns) = &self.edns {
            edns.write_to(&mut buf);
        }

        buf.freeze()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; ->>HEADER<<- {}", self.header)?;
        if let Some(edns) = &self.edns {
            writeln!(f, ";; OPT: {edns}")?;
        }

        writeln!(f, ";; QUESTION SECTION:")?;
        for q in &self.questions {
            writeln!(f, ";{q}")?;
        }

        for (label, section) in [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authority),
            ("ADDITIONAL", &self.additional),
        ] {
            if !section.is_empty() {
                writeln!(f, "\n;; {label} SECTION:")?;
                for r in section.iter() {
                    writeln!(f, "{r}")?;
                }
            }
        }

        Ok(())
    }
}
